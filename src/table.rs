use std::collections::HashSet;

use crate::error::{Result, StoreError};
use crate::schema::Schema;
use crate::value::Value;

/// One row of values, positionally matching a table's schema.
pub type Row = Vec<Value>;

/// A named schema plus its rows.
///
/// Rows have no identity beyond their index. Deleting a row shifts every
/// later row down by one, so indices held by callers go stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn validate_row(&self, row: &[Value]) -> Result<()> {
        self.schema.validate(row)
    }

    /// Validates and appends a row. Nothing is appended on failure.
    pub fn add_row(&mut self, row: Row) -> Result<()> {
        self.validate_row(&row)?;
        self.rows.push(row);
        Ok(())
    }

    /// Replaces the row at `index`, returning the previous contents.
    ///
    /// Writing the returned row back with another `edit_row` undoes the edit,
    /// provided no delete has shifted the index in between.
    pub fn edit_row(&mut self, index: usize, row: Row) -> Result<Row> {
        self.check_index(index)?;
        self.validate_row(&row)?;
        Ok(std::mem::replace(&mut self.rows[index], row))
    }

    /// Removes the row at `index`, shifting later rows down by one.
    pub fn delete_row(&mut self, index: usize) -> Result<Row> {
        self.check_index(index)?;
        Ok(self.rows.remove(index))
    }

    pub fn view_rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows of `self` that are not equal to any row of `other`, in `self`'s
    /// order. Both tables must have identical schemas.
    pub fn difference(&self, other: &Table) -> Result<Vec<Row>> {
        if self.schema != other.schema {
            return Err(StoreError::SchemaMismatch {
                left: self.schema.to_string(),
                right: other.schema.to_string(),
            });
        }

        let other_rows: HashSet<&Row> = other.rows.iter().collect();
        Ok(self
            .rows
            .iter()
            .filter(|row| !other_rows.contains(row))
            .cloned()
            .collect())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.rows.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{DateInterval, FieldType};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn users() -> Table {
        let schema = Schema::new([
            ("id", FieldType::Integer),
            ("name", FieldType::Text),
            ("dob", FieldType::Date),
        ])
        .unwrap();
        Table::new("users", schema)
    }

    fn user(id: i64, name: &str, dob: NaiveDate) -> Row {
        vec![Value::Integer(id), Value::from(name), Value::Date(dob)]
    }

    #[test]
    fn test_add_row_appends() {
        let mut table = users();
        table.add_row(user(1, "John Doe", date(1990, 5, 15))).unwrap();
        table.add_row(user(2, "Jane Doe", date(1992, 8, 23))).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.view_rows()[1], user(2, "Jane Doe", date(1992, 8, 23)));
    }

    #[test]
    fn test_add_row_wrong_length_leaves_table_unchanged() {
        let mut table = users();
        table.add_row(user(1, "John Doe", date(1990, 5, 15))).unwrap();

        let err = table
            .add_row(vec![Value::Integer(2), Value::from("short")])
            .unwrap_err();
        assert!(matches!(err, StoreError::RowShapeMismatch { expected: 3, actual: 2 }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_add_row_wrong_type_leaves_table_unchanged() {
        let mut table = users();
        let err = table
            .add_row(vec![Value::Real(1.0), Value::from("x"), Value::Date(date(2000, 1, 1))])
            .unwrap_err();
        assert!(matches!(err, StoreError::SchemaViolation { ref field, .. } if field == "id"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_edit_row_returns_previous_and_undoes() {
        let mut table = users();
        let original = user(1, "John Doe", date(1990, 5, 15));
        table.add_row(original.clone()).unwrap();
        let before = table.clone();

        let edited = user(1, "John Doe", date(1992, 8, 23));
        let old = table.edit_row(0, edited.clone()).unwrap();
        assert_eq!(old, original);
        assert_eq!(table.row(0), Some(&edited));

        table.edit_row(0, old).unwrap();
        assert_eq!(table, before);
    }

    #[test]
    fn test_edit_row_invalid_data_is_rejected() {
        let mut table = users();
        table.add_row(user(1, "John Doe", date(1990, 5, 15))).unwrap();
        let before = table.clone();

        let err = table
            .edit_row(0, vec![Value::from("1"), Value::from("x"), Value::Date(date(1990, 1, 1))])
            .unwrap_err();
        assert!(matches!(err, StoreError::SchemaViolation { .. }));
        assert_eq!(table, before);
    }

    #[test]
    fn test_edit_row_out_of_range() {
        let mut table = users();
        let err = table.edit_row(0, user(1, "x", date(2000, 1, 1))).unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn test_delete_row_shifts_later_rows() {
        let mut table = users();
        for id in 0..3 {
            table.add_row(user(id, "n", date(2000, 1, 1))).unwrap();
        }

        let removed = table.delete_row(1).unwrap();
        assert_eq!(removed[0], Value::Integer(1));
        assert_eq!(table.len(), 2);
        assert_eq!(table.view_rows()[1][0], Value::Integer(2));
    }

    #[test]
    fn test_delete_row_out_of_range_leaves_table_unchanged() {
        let mut table = users();
        table.add_row(user(1, "n", date(2000, 1, 1))).unwrap();

        let err = table.delete_row(1).unwrap_err();
        assert!(matches!(err, StoreError::IndexOutOfRange { index: 1, len: 1 }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_difference_by_value() {
        let mut users_table = users();
        let mut employees = Table::new("employees", users_table.schema().clone());

        users_table.add_row(user(1, "John Doe", date(1990, 5, 15))).unwrap();
        users_table.add_row(user(2, "Jane Smith", date(1985, 7, 20))).unwrap();
        users_table.add_row(user(3, "Ann Lee", date(1970, 1, 2))).unwrap();
        employees.add_row(user(2, "Jane Smith", date(1985, 7, 20))).unwrap();
        employees.add_row(user(4, "Bob Ray", date(1999, 9, 9))).unwrap();

        let diff = users_table.difference(&employees).unwrap();
        assert_eq!(
            diff,
            vec![
                user(1, "John Doe", date(1990, 5, 15)),
                user(3, "Ann Lee", date(1970, 1, 2)),
            ]
        );

        let reverse = employees.difference(&users_table).unwrap();
        assert_eq!(reverse, vec![user(4, "Bob Ray", date(1999, 9, 9))]);
    }

    #[test]
    fn test_difference_with_self_is_empty() {
        let mut table = users();
        table.add_row(user(1, "a", date(2000, 1, 1))).unwrap();
        table.add_row(user(1, "a", date(2000, 1, 1))).unwrap();
        assert!(table.difference(&table).unwrap().is_empty());
    }

    #[test]
    fn test_difference_keeps_duplicates_of_missing_rows() {
        let mut left = users();
        let right = Table::new("right", left.schema().clone());
        left.add_row(user(1, "a", date(2000, 1, 1))).unwrap();
        left.add_row(user(1, "a", date(2000, 1, 1))).unwrap();
        assert_eq!(left.difference(&right).unwrap().len(), 2);
    }

    #[test]
    fn test_difference_requires_matching_schema() {
        let left = users();
        let reordered = Schema::new([
            ("name", FieldType::Text),
            ("id", FieldType::Integer),
            ("dob", FieldType::Date),
        ])
        .unwrap();
        let right = Table::new("other", reordered);

        assert!(matches!(
            left.difference(&right),
            Err(StoreError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_interval_and_char_fields() {
        let schema = Schema::new([
            ("grade", FieldType::Char),
            ("stay", FieldType::DateInterval),
        ])
        .unwrap();
        let mut table = Table::new("stays", schema);
        let stay = DateInterval::new(date(2024, 5, 1), date(2024, 5, 10)).unwrap();

        table.add_row(vec![Value::from('A'), Value::from(stay)]).unwrap();
        assert!(table
            .add_row(vec![Value::from("AB"), Value::from(stay)])
            .is_err());
        assert!(table
            .add_row(vec![Value::from('B'), Value::Date(date(2024, 5, 1))])
            .is_err());
        assert_eq!(table.len(), 1);
    }
}
