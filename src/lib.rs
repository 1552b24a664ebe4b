pub mod codec;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod schema;
pub mod store;
pub mod table;
pub mod value;

// Store file format constants
pub const STORE_MAGIC: &[u8; 4] = b"TBST";
pub const STORE_VERSION: u16 = 1;
/// Magic plus version.
pub const STORE_HEADER_SIZE: usize = 6;
pub const DEFAULT_EXTENSION: &str = "db";

// Re-export main types for convenience
pub use commands::execute_command;
pub use config::StoreConfig;
pub use database::Database;
pub use error::{Result, StoreError};
pub use schema::{Field, Schema};
pub use store::Store;
pub use table::{Row, Table};
pub use value::{parse_date, DateInterval, FieldType, Value};
