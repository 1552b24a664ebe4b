use std::collections::btree_map::{BTreeMap, Entry};

use crate::error::{Result, StoreError};
use crate::schema::Schema;
use crate::table::{Row, Table};

/// A named collection of tables with unique names.
///
/// Tables are kept in name order so listings and the encoded form are
/// deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    name: String,
    tables: BTreeMap<String, Table>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A loaded database takes the name of the file it was read from.
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Creates an empty table. Fails if the name is blank or already taken,
    /// leaving existing tables untouched.
    pub fn create_table(&mut self, name: &str, schema: Schema) -> Result<&mut Table> {
        if name.trim().is_empty() {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        match self.tables.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::TableAlreadyExists(name.to_string())),
            Entry::Vacant(slot) => Ok(slot.insert(Table::new(name, schema))),
        }
    }

    /// Removes a table and all of its rows.
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.tables
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    pub fn contains_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Rows of table `left` absent from table `right`.
    pub fn difference(&self, left: &str, right: &str) -> Result<Vec<Row>> {
        self.table(left)?.difference(self.table(right)?)
    }

    /// Inserts an already-populated table, used when decoding a store.
    pub(crate) fn insert_table(&mut self, table: Table) -> Result<()> {
        match self.tables.entry(table.name().to_string()) {
            Entry::Occupied(slot) => Err(StoreError::TableAlreadyExists(slot.key().clone())),
            Entry::Vacant(slot) => {
                slot.insert(table);
                Ok(())
            }
        }
    }
}
