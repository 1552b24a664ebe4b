use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::{Result, StoreError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Declared type of a table field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Real,
    /// Text constrained to exactly one character.
    Char,
    Text,
    Date,
    DateInterval,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Integer,
        FieldType::Real,
        FieldType::Char,
        FieldType::Text,
        FieldType::Date,
        FieldType::DateInterval,
    ];

    /// The token used for this type in schema definitions.
    pub fn keyword(self) -> &'static str {
        match self {
            FieldType::Integer => "int",
            FieldType::Real => "real",
            FieldType::Char => "char",
            FieldType::Text => "string",
            FieldType::Date => "date",
            FieldType::DateInterval => "dateInvl",
        }
    }

    /// Returns true if `value` is acceptable for a field of this type.
    ///
    /// Type identity is checked, not convertibility: an integer is never a
    /// valid `Real`.
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Integer, Value::Integer(_)) => true,
            (FieldType::Real, Value::Real(_)) => true,
            (FieldType::Char, Value::Text(s)) => s.chars().count() == 1,
            (FieldType::Text, Value::Text(_)) => true,
            (FieldType::Date, Value::Date(_)) => true,
            (FieldType::DateInterval, Value::DateInterval(_)) => true,
            _ => false,
        }
    }

    /// Converts user-entered text into a value of this type.
    ///
    /// `Char` input is taken verbatim; its length is checked when the row
    /// is validated against a table.
    pub fn parse_value(self, input: &str) -> Result<Value> {
        let invalid = || StoreError::InvalidValue {
            expected: self,
            input: input.to_string(),
        };
        match self {
            FieldType::Integer => input.trim().parse().map(Value::Integer).map_err(|_| invalid()),
            FieldType::Real => input.trim().parse().map(Value::Real).map_err(|_| invalid()),
            FieldType::Char | FieldType::Text => Ok(Value::Text(input.to_string())),
            FieldType::Date => parse_date(input).map(Value::Date),
            FieldType::DateInterval => input.parse().map(Value::DateInterval),
        }
    }
}

impl FromStr for FieldType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim();
        FieldType::ALL
            .into_iter()
            .find(|t| t.keyword() == token)
            .ok_or_else(|| StoreError::UnknownFieldType(token.to_string()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| StoreError::InvalidDateFormat(s.to_string()))
}

/// A closed range of calendar dates with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateInterval {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateInterval {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(StoreError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl FromStr for DateInterval {
    type Err = StoreError;

    /// Accepts `start..end` or `start to end`.
    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once("..")
            .or_else(|| s.split_once(" to "))
            .ok_or_else(|| StoreError::InvalidDateFormat(s.to_string()))?;
        DateInterval::new(parse_date(start)?, parse_date(end)?)
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// A single typed cell value.
///
/// `Char` fields hold `Text` values of length one; the declared field type,
/// not the value, tells them apart.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    DateInterval(DateInterval),
}

impl Value {
    /// Describes the runtime type of this value for error messages.
    pub fn type_description(&self) -> String {
        match self {
            Value::Integer(_) => "int".to_string(),
            Value::Real(_) => "real".to_string(),
            Value::Text(s) => match s.chars().count() {
                1 => "char".to_string(),
                n => format!("string of length {}", n),
            },
            Value::Date(_) => "date".to_string(),
            Value::DateInterval(_) => "dateInvl".to_string(),
        }
    }

    /// Format the value for display
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }
}

// Reals compare by bit pattern so that equality, hashing and the on-disk
// encoding all agree.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a.to_bits() == b.to_bits(),
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::DateInterval(a), Value::DateInterval(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Integer(i) => i.hash(state),
            Value::Real(r) => r.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateInterval(i) => i.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::DateInterval(i) => write!(f, "{}", i),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateInterval> for Value {
    fn from(v: DateInterval) -> Self {
        Value::DateInterval(v)
    }
}
