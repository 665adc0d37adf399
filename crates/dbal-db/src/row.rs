//! Result rows and typed value extraction.

use dbal_core::{DbalError, DbalResult};

use crate::value::{Value, DATETIME_FORMAT};

/// One result row: column names and their values, in select order.
///
/// `Row` is what a [`RowSet`](crate::executor::RowSet) hands back for each
/// fetch; typed access goes through [`get`](Row::get).
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns `true` if the row carries the named column.
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Gets a typed value by column name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist or the value cannot be
    /// converted to the requested type.
    pub fn get<T: FromValue>(&self, column: &str) -> DbalResult<T> {
        let value = self.get_value(column).ok_or_else(|| {
            DbalError::DatabaseError(format!("Column '{column}' not found in row"))
        })?;
        T::from_value(value).map_err(|e| match e {
            DbalError::DatabaseError(msg) => {
                DbalError::DatabaseError(format!("Column '{column}': {msg}"))
            }
            other => other,
        })
    }

    /// Gets a typed value by column index.
    pub fn get_by_index<T: FromValue>(&self, idx: usize) -> DbalResult<T> {
        let value = self.values.get(idx).ok_or_else(|| {
            DbalError::DatabaseError(format!(
                "Column index {idx} out of bounds (row has {} columns)",
                self.values.len()
            ))
        })?;
        T::from_value(value)
    }

    /// Returns a reference to the raw Value at the given column name.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }
}

/// Trait for converting a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> DbalResult<Self>;
}

fn mismatch(expected: &str, value: &Value) -> DbalError {
    DbalError::DatabaseError(format!("Expected {expected}, got {value:?}"))
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> DbalResult<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::Bool(b) => Ok(Self::from(*b)),
            Value::String(s) => s.trim().parse().map_err(|_| mismatch("Int", value)),
            _ => Err(mismatch("Int", value)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> DbalResult<Self> {
        let wide = i64::from_value(value)?;
        Self::try_from(wide)
            .map_err(|e| DbalError::DatabaseError(format!("Int value out of i32 range: {e}")))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> DbalResult<Self> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as Self),
            _ => Err(mismatch("Float", value)),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> DbalResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            _ => Err(mismatch("Bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> DbalResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Int(_) | Value::Float(_) => Ok(value.to_string()),
            _ => Err(mismatch("String", value)),
        }
    }
}

impl FromValue for chrono::NaiveDateTime {
    fn from_value(value: &Value) -> DbalResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            Value::String(s) => Self::parse_from_str(s, DATETIME_FORMAT)
                .map_err(|e| DbalError::DatabaseError(format!("Invalid date-time '{s}': {e}"))),
            _ => Err(mismatch("DateTime", value)),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> DbalResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            Value::String(s) => Ok(s.clone().into_bytes()),
            _ => Err(mismatch("Bytes", value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> DbalResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> DbalResult<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}
