//! Backend-agnostic database values and their SQL literal form.
//!
//! The [`Value`] enum is used for where-term operands, assignment values,
//! identifiers and row contents. [`Value::to_sql_literal`] is the single
//! quoting rule of the crate: numbers (and numeric-looking strings) are
//! emitted bare, everything else is single-quoted with `\` and `'`
//! backslash-escaped. This is basic quoting, not injection protection.

use std::fmt;

/// A backend-agnostic representation of a database value.
///
/// # Examples
///
/// ```
/// use dbal_db::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
/// assert_eq!(Value::from("O'Hara").to_sql_literal(), r"'O\'Hara'");
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw bytes from a BLOB column.
    Bytes(Vec<u8>),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time without timezone.
    DateTime(chrono::NaiveDateTime),
    /// A list of values, rendered as `(a,b,c)` for IN-style operators.
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Self::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// The textual date-time layout used in literals and when reading text columns.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Self::String(v.clone())
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for values an identifier guard treats as "unset":
    /// NULL, `false`, zero and the empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::String(s) => s.is_empty(),
            Self::Bytes(b) => b.is_empty(),
            Self::List(vals) => vals.is_empty(),
            Self::Date(_) | Self::DateTime(_) => false,
        }
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the value as a SQL literal.
    ///
    /// - NULL renders `NULL`, booleans `1`/`0`
    /// - integers, finite floats and numeric-looking strings render bare
    /// - bytes render as a hex blob literal, `X'01ff'`
    /// - lists render as `(a,b,c)`, each element by these same rules
    /// - everything else is quoted via [`quote`]
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) if f.is_finite() => f.to_string(),
            Self::Float(f) => quote(&f.to_string()),
            Self::String(s) if is_numeric(s) => s.trim().to_string(),
            Self::String(s) => quote(s),
            Self::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02x}")).collect();
                format!("X'{hex}'")
            }
            Self::Date(d) => quote(&d.to_string()),
            Self::DateTime(dt) => quote(&dt.format(DATETIME_FORMAT).to_string()),
            Self::List(vals) => {
                let items: Vec<String> = vals.iter().map(Self::to_sql_literal).collect();
                format!("({})", items.join(","))
            }
        }
    }
}

/// Wraps `raw` in single quotes, backslash-escaping `\` and `'`.
pub fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for ch in raw.chars() {
        if ch == '\\' || ch == '\'' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('\'');
    out
}

/// Returns `true` if `raw` reads as a decimal number (optional sign,
/// fraction and exponent, surrounding whitespace allowed).
///
/// Spellings such as `inf` or `NaN`, which `f64::from_str` accepts, are
/// not numeric here.
pub fn is_numeric(raw: &str) -> bool {
    let s = raw.trim();
    if s.is_empty() {
        return false;
    }
    let plain = s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    plain && s.chars().any(|c| c.is_ascii_digit()) && s.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_scalars() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(42_i32), Value::Int(42));
        assert_eq!(Value::from(7_u32), Value::Int(7));
        assert_eq!(Value::from(1.5_f64), Value::Float(1.5));
        assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(Some(42_i64)), Value::Int(42));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn test_from_vec() {
        let v = Value::from(vec!["a", "b"]);
        assert_eq!(
            v,
            Value::List(vec![Value::from("a"), Value::from("b")])
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::String("hello".into()).to_string(), "hello");
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list.to_string(), "[1, 2]");
    }

    #[test]
    fn test_is_blank() {
        assert!(Value::Null.is_blank());
        assert!(Value::Int(0).is_blank());
        assert!(Value::String(String::new()).is_blank());
        assert!(!Value::Int(11077).is_blank());
        assert!(!Value::from("VINET").is_blank());
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("123"));
        assert!(is_numeric(" 123 "));
        assert!(is_numeric("-4.5"));
        assert!(is_numeric("1e3"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("inf"));
        assert!(!is_numeric("NaN"));
        assert!(!is_numeric("12abc"));
        assert!(!is_numeric("e"));
        assert!(!is_numeric("."));
    }

    #[test]
    fn test_literal_numbers_unquoted() {
        assert_eq!(Value::Int(1).to_sql_literal(), "1");
        assert_eq!(Value::Float(2.5).to_sql_literal(), "2.5");
        assert_eq!(Value::from("100").to_sql_literal(), "100");
        assert_eq!(Value::from(" 123 ").to_sql_literal(), "123");
    }

    #[test]
    fn test_literal_strings_quoted_and_escaped() {
        assert_eq!(Value::from("hello").to_sql_literal(), "'hello'");
        assert_eq!(Value::from("test\"s").to_sql_literal(), "'test\"s'");
        assert_eq!(Value::from("it's").to_sql_literal(), r"'it\'s'");
        assert_eq!(Value::from(r"a\b").to_sql_literal(), r"'a\\b'");
    }

    #[test]
    fn test_literal_null_and_bool() {
        assert_eq!(Value::Null.to_sql_literal(), "NULL");
        assert_eq!(Value::Bool(true).to_sql_literal(), "1");
        assert_eq!(Value::Bool(false).to_sql_literal(), "0");
    }

    #[test]
    fn test_literal_list() {
        let v = Value::from(vec!["a", "b", "c"]);
        assert_eq!(v.to_sql_literal(), "('a','b','c')");
        let v = Value::from(vec![1_i64, 2, 3]);
        assert_eq!(v.to_sql_literal(), "(1,2,3)");
    }

    #[test]
    fn test_literal_datetime() {
        let dt = chrono::NaiveDate::from_ymd_opt(1996, 7, 4)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Value::from(dt).to_sql_literal(), "'1996-07-04 00:00:00'");
    }

    #[test]
    fn test_json_tagged_form() {
        let json = serde_json::to_value(Value::Int(5)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "Int", "value": 5}));
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, Value::Int(5));
    }

    #[test]
    fn test_bytes() {
        let blob = Value::Bytes(vec![0x01, 0xff, 0x10]);
        assert_eq!(blob.to_string(), "<3 bytes>");
        assert_eq!(blob.to_sql_literal(), "X'01ff10'");
        assert!(!blob.is_blank());
        assert!(Value::Bytes(Vec::new()).is_blank());
    }
}
