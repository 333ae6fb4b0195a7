//! Flat-row cells

use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};

/// One scalar cell of a flattened row
///
/// `Missing` (the path did not resolve) and `Null` (the record holds an
/// explicit null) are kept apart here; the writer renders both as the
/// configured null representation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Selector did not resolve
    #[default]
    Missing,
    /// Explicit null
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Unicode text
    Text(String),
    /// Text in the data source's encoding
    Bytes(Vec<u8>),
    /// Timestamp without timezone
    DateTime(NaiveDateTime),
    /// Calendar date
    Date(NaiveDate),
}

/// An ordered sequence of cells
pub type FlatRow = Vec<Cell>;

impl Cell {
    /// Whether the cell renders as the null representation
    #[inline]
    #[must_use]
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Self::Missing | Self::Null)
    }
}

/// A list or mapping where a scalar was required
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a scalar value, got {kind}")]
pub struct NotScalar {
    /// Variant name of the offending value
    pub kind: &'static str,
}

impl TryFrom<&Value> for Cell {
    type Error = NotScalar;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Int(*i),
            Value::Float(f) => Self::Float(*f),
            Value::Text(s) => Self::Text(s.clone()),
            Value::Bytes(b) => Self::Bytes(b.clone()),
            Value::DateTime(dt) => Self::DateTime(*dt),
            Value::Date(d) => Self::Date(*d),
            Value::List(_) | Value::Map(_) => {
                return Err(NotScalar { kind: value.kind() });
            }
        })
    }
}

impl TryFrom<Value> for Cell {
    type Error = NotScalar;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let kind = value.kind();
        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Int(i) => Self::Int(i),
            Value::Float(f) => Self::Float(f),
            Value::Text(s) => Self::Text(s),
            Value::Bytes(b) => Self::Bytes(b),
            Value::DateTime(dt) => Self::DateTime(dt),
            Value::Date(d) => Self::Date(d),
            Value::List(_) | Value::Map(_) => {
                return Err(NotScalar { kind });
            }
        })
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Cell {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Cell {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_values_convert() {
        assert_eq!(Cell::try_from(&Value::Int(7)), Ok(Cell::Int(7)));
        assert_eq!(Cell::try_from(Value::from("a")), Ok(Cell::Text("a".into())));
        assert_eq!(Cell::try_from(&Value::Null), Ok(Cell::Null));
    }

    #[test]
    fn containers_are_rejected() {
        let err = Cell::try_from(&Value::list([1])).unwrap_err();
        assert_eq!(err.kind, "list");
        assert_eq!(err.to_string(), "expected a scalar value, got list");

        assert!(Cell::try_from(Value::map([("k", 1)])).is_err());
    }

    #[test]
    fn missing_and_null_are_distinct_but_nullish() {
        assert_ne!(Cell::Missing, Cell::Null);
        assert!(Cell::Missing.is_nullish());
        assert!(Cell::Null.is_nullish());
        assert!(!Cell::from("").is_nullish());
    }
}
