use std::collections::HashSet;
use std::fmt;

use crate::error::{Result, StoreError};
use crate::value::{FieldType, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
}

/// Ordered field list describing the shape of a table's rows.
///
/// Equality is positional: the same fields in a different order make a
/// different schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    pub fn new<N, I>(fields: I) -> Result<Self>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, FieldType)>,
    {
        let fields: Vec<Field> = fields
            .into_iter()
            .map(|(name, field_type)| Field {
                name: name.into(),
                field_type,
            })
            .collect();

        let mut seen = HashSet::new();
        for field in &fields {
            if field.name.trim().is_empty() {
                return Err(StoreError::InvalidName(field.name.clone()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(StoreError::DuplicateField(field.name.clone()));
            }
        }

        Ok(Schema { fields })
    }

    /// Parses `name:type, name:type, ...` using the `int`, `real`, `char`,
    /// `string`, `date` and `dateInvl` type keywords.
    pub fn parse(definition: &str) -> Result<Self> {
        let mut fields = Vec::new();
        for part in definition.split(',') {
            let (name, type_name) = part
                .split_once(':')
                .ok_or_else(|| StoreError::MalformedField(part.trim().to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(StoreError::MalformedField(part.trim().to_string()));
            }
            fields.push((name.to_string(), type_name.parse::<FieldType>()?));
        }

        Schema::new(fields)
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Checks row length, then every value against its declared field type.
    pub fn validate(&self, row: &[Value]) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(StoreError::RowShapeMismatch {
                expected: self.fields.len(),
                actual: row.len(),
            });
        }

        for (field, value) in self.fields.iter().zip(row) {
            if !field.field_type.matches(value) {
                return Err(StoreError::SchemaViolation {
                    field: field.name.clone(),
                    expected: field.field_type,
                    actual: value.type_description(),
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}:{}", field.name, field.field_type)?;
        }
        Ok(())
    }
}
