//! Error types for the table store.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::value::FieldType;

/// Result type alias using StoreError.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in table store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    // Row validation errors
    #[error("Invalid type for field '{field}': expected {expected}, got {actual}")]
    SchemaViolation {
        field: String,
        expected: FieldType,
        actual: String,
    },

    #[error("Row length does not match table schema: expected {expected} values, got {actual}")]
    RowShapeMismatch { expected: usize, actual: usize },

    #[error("Schemas do not match, cannot compute difference: ({left}) vs ({right})")]
    SchemaMismatch { left: String, right: String },

    #[error("Row index {index} out of range (table has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },

    // Table lifecycle errors
    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),

    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    // Schema definition errors
    #[error("Unknown field type '{0}'")]
    UnknownFieldType(String),

    #[error("Duplicate field '{0}' in schema")]
    DuplicateField(String),

    #[error("Malformed field definition '{0}', expected name:type")]
    MalformedField(String),

    // Value parsing errors
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDateFormat(String),

    #[error("Invalid date interval: start {start} is after end {end}")]
    InvalidInterval { start: NaiveDate, end: NaiveDate },

    #[error("Invalid {expected} value '{input}'")]
    InvalidValue { expected: FieldType, input: String },

    // Persistence errors
    #[error("Store corrupted: {0}")]
    CorruptStore(String),

    #[error("Database not found at {}", .0.display())]
    DatabaseNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Shorthand for a decode failure.
    pub(crate) fn corrupt(reason: impl Into<String>) -> Self {
        StoreError::CorruptStore(reason.into())
    }
}
