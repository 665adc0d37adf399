//! Typed clause terms used by the [`Builder`](super::builder::Builder).
//!
//! A [`Condition`] is a `(column, operator, value)` triple. Where-terms and
//! having-terms render the value as a SQL literal; join conditions render it
//! verbatim, since the right-hand side of `ON a = b` is usually a column.

use std::fmt;

use crate::value::Value;

/// The boolean connective between two where-terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// `AND`
    And,
    /// `OR`
    Or,
}

impl Connective {
    /// The SQL keyword.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A `(column, operator, value)` triple.
///
/// # Examples
///
/// ```
/// use dbal_db::query::Condition;
///
/// let c = Condition::from(("ShipCountry", "IN", vec!["France", "Germany"]));
/// assert_eq!(c.render(), "ShipCountry IN ('France','Germany')");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    operator: String,
    value: Value,
}

impl Condition {
    /// Creates a condition.
    pub fn new(column: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// The left-hand column.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// The comparison operator.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The right-hand value.
    pub const fn value(&self) -> &Value {
        &self.value
    }

    /// `true` when the column or operator is missing.
    pub fn is_empty(&self) -> bool {
        self.column.trim().is_empty() || self.operator.trim().is_empty()
    }

    /// Renders `column operator literal`.
    pub fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.column,
            self.operator,
            self.value.to_sql_literal()
        )
    }

    /// Renders `column operator value` with the value unquoted.
    pub fn render_raw(&self) -> String {
        format!("{} {} {}", self.column, self.operator, self.value)
    }
}

impl<C, O, V> From<(C, O, V)> for Condition
where
    C: Into<String>,
    O: Into<String>,
    V: Into<Value>,
{
    fn from((column, operator, value): (C, O, V)) -> Self {
        Self::new(column, operator, value)
    }
}

/// One entry of a WHERE chain. The first term carries no connective.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereTerm {
    pub(crate) connective: Option<Connective>,
    pub(crate) condition: Condition,
}

impl WhereTerm {
    /// The connective placed before this term, if any.
    pub const fn connective(&self) -> Option<Connective> {
        self.connective
    }

    /// The term's condition.
    pub const fn condition(&self) -> &Condition {
        &self.condition
    }
}

/// Renders a WHERE chain in order: `a = 1 AND b = 2 OR c = 3`.
pub(crate) fn render_where_terms(terms: &[WhereTerm]) -> String {
    let mut out = String::new();
    for term in terms {
        if !out.is_empty() {
            out.push(' ');
            if let Some(conn) = term.connective {
                out.push_str(conn.keyword());
                out.push(' ');
            }
        }
        out.push_str(&term.condition.render());
    }
    out
}

/// The kind of a JOIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    /// `INNER JOIN`
    #[default]
    Inner,
    /// `OUTER JOIN`
    Outer,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
}

impl JoinType {
    /// The SQL keyword pair.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Outer => "OUTER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
        }
    }
}

/// A join: type, table, alias, and ON terms in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    join_type: JoinType,
    table: String,
    alias: String,
    terms: Vec<String>,
}

impl Join {
    /// Creates a join. A missing alias defaults to the table's first character.
    pub(crate) fn new(join_type: JoinType, table: &str, alias: Option<&str>, on: &Condition) -> Self {
        let table = table.trim().to_string();
        let alias = alias
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map_or_else(|| table.chars().take(1).collect(), ToString::to_string);
        Self {
            join_type,
            table,
            alias,
            terms: vec![on.render_raw()],
        }
    }

    /// Appends a condition, optionally preceded by a connective.
    pub(crate) fn extend(&mut self, connective: Option<Connective>, on: &Condition) {
        if let Some(conn) = connective {
            self.terms.push(conn.keyword().to_string());
        }
        self.terms.push(on.render_raw());
    }

    /// The join type.
    pub const fn join_type(&self) -> JoinType {
        self.join_type
    }

    /// The joined table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The alias (defaulted when not given).
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Renders `INNER JOIN alias.table ON terms...`.
    pub fn render(&self) -> String {
        format!(
            "{} {}.{} ON {}",
            self.join_type.keyword(),
            self.alias,
            self.table,
            self.terms.join(" ")
        )
    }
}

/// One `WHEN column op operand THEN result` arm of a CASE column.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseWhen {
    condition: Condition,
    result: Value,
}

impl CaseWhen {
    /// Creates a WHEN arm.
    pub fn new(condition: impl Into<Condition>, result: impl Into<Value>) -> Self {
        Self {
            condition: condition.into(),
            result: result.into(),
        }
    }

    /// Renders `WHEN ... THEN ...`.
    pub fn render(&self) -> String {
        format!(
            "WHEN {} THEN {}",
            self.condition.render(),
            self.result.to_sql_literal()
        )
    }
}
