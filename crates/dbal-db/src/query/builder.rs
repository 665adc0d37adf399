//! The fluent SQL statement builder.
//!
//! One [`Builder`] describes one statement. It is created by one of the
//! entry points ([`Builder::select`], [`Builder::update`],
//! [`Builder::insert`], [`Builder::delete`], [`Builder::replace`]),
//! accumulates clauses through consuming `self -> Self` calls, and renders
//! on demand. Rendering is pure: [`Builder::to_sql`] can be called any
//! number of times and yields the same text.
//!
//! Clause order in a SELECT is fixed:
//!
//! ```text
//! SELECT [SQL_CALC_FOUND_ROWS] [DISTINCT] <columns>[, CASE ... END]
//!   FROM <table>[ AS alias] [joins] [WHERE ...] [GROUP BY ...]
//!   [HAVING ...] [ORDER BY ...] [LIMIT ...]
//! ```
//!
//! The builder does not validate SQL semantics. Values are quoted by
//! [`Value::to_sql_literal`]; column names, operators and join conditions
//! are emitted verbatim.

use std::fmt;

use dbal_core::{DbalError, DbalResult};

use super::clause::{
    render_where_terms, CaseWhen, Condition, Connective, Join, JoinType, WhereTerm,
};
use crate::value::Value;

/// Aggregate functions accepted as a single expression by [`Builder::columns`].
pub const AGGREGATE_FUNCTIONS: [&str; 5] = ["AVG", "COUNT", "MAX", "MIN", "SUM"];

/// The statement kind a builder renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `SELECT`
    Select,
    /// `UPDATE`
    Update,
    /// `INSERT`
    Insert,
    /// `DELETE`
    Delete,
    /// `REPLACE`
    Replace,
}

impl Operation {
    const fn keyword(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Update => "UPDATE",
            Self::Insert => "INSERT",
            Self::Delete => "DELETE",
            Self::Replace => "REPLACE",
        }
    }

    const fn assigns(self) -> bool {
        matches!(self, Self::Update | Self::Insert | Self::Replace)
    }
}

/// One entry of the column list.
#[derive(Debug, Clone, PartialEq)]
enum ColumnSpec {
    /// A bare column or expression.
    Name(String),
    /// `expr AS alias`
    Aliased { expr: String, alias: String },
    /// `column = literal`
    Assign { column: String, literal: String },
}

impl ColumnSpec {
    fn render(&self) -> String {
        match self {
            Self::Name(name) => name.clone(),
            Self::Aliased { expr, alias } => format!("{expr} AS {alias}"),
            Self::Assign { column, literal } => format!("{column} = {literal}"),
        }
    }
}

/// A fluent SQL statement builder.
///
/// # Examples
///
/// ```
/// use dbal_db::query::Builder;
///
/// let sql = Builder::select("Orders", Some("o"))?
///     .columns("OrderID, ShipCity")
///     .where_(("ShipCountry", "=", "France"))
///     .and_where(("EmployeeID", ">", 3))
///     .order_by("OrderID DESC")
///     .offset_limits(10, 5)
///     .to_sql()?;
///
/// assert_eq!(
///     sql,
///     "SELECT OrderID, ShipCity FROM Orders AS o WHERE ShipCountry = 'France' \
///      AND EmployeeID > 3 ORDER BY OrderID DESC LIMIT 10, 5"
/// );
/// # Ok::<(), dbal_core::DbalError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Builder {
    table: String,
    alias: Option<String>,
    operation: Operation,
    columns: Vec<ColumnSpec>,
    wheres: Vec<WhereTerm>,
    joins: Vec<Join>,
    cases: Vec<CaseWhen>,
    group_by: Vec<String>,
    having: Vec<Condition>,
    order_by: Vec<String>,
    offset: Option<u64>,
    limit: Option<u64>,
    calc_found_rows: bool,
    distinct: bool,
}

impl Builder {
    fn new(operation: Operation, table: &str, alias: Option<&str>) -> DbalResult<Self> {
        let table = table.trim();
        if table.is_empty() {
            return Err(DbalError::UsageError(format!(
                "{}: missing table name",
                operation.keyword()
            )));
        }
        Ok(Self {
            table: table.to_string(),
            alias: alias
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(ToString::to_string),
            operation,
            columns: Vec::new(),
            wheres: Vec::new(),
            joins: Vec::new(),
            cases: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            offset: None,
            limit: None,
            calc_found_rows: false,
            distinct: false,
        })
    }

    /// Starts a SELECT. An empty table name is a usage error.
    pub fn select(table: &str, alias: Option<&str>) -> DbalResult<Self> {
        Self::new(Operation::Select, table, alias)
    }

    /// Starts an UPDATE.
    pub fn update(table: &str, alias: Option<&str>) -> DbalResult<Self> {
        Self::new(Operation::Update, table, alias)
    }

    /// Starts an INSERT.
    pub fn insert(table: &str, alias: Option<&str>) -> DbalResult<Self> {
        Self::new(Operation::Insert, table, alias)
    }

    /// Starts a DELETE.
    pub fn delete(table: &str, alias: Option<&str>) -> DbalResult<Self> {
        Self::new(Operation::Delete, table, alias)
    }

    /// Starts a REPLACE, rendered with the INSERT layout.
    pub fn replace(table: &str, alias: Option<&str>) -> DbalResult<Self> {
        Self::new(Operation::Replace, table, alias)
    }

    /// The target table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The table alias, if any.
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The statement kind.
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    // ── Columns ───────────────────────────────────────────────────────

    /// Adds columns from a string.
    ///
    /// A comma-separated list is split and trimmed. Without a comma the
    /// string is taken as one column, or as one aggregate expression when it
    /// calls a function from [`AGGREGATE_FUNCTIONS`]. Calls to any other
    /// function are ignored.
    pub fn columns(mut self, columns: &str) -> Self {
        if columns.contains(',') {
            self.columns.extend(
                columns
                    .split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(|c| ColumnSpec::Name(c.to_string())),
            );
            return self;
        }

        let column = columns.trim();
        if column.is_empty() {
            tracing::warn!(table = %self.table, "ignoring empty column list");
            return self;
        }
        if let Some(open) = column.find('(') {
            let function = column[..open].trim().to_ascii_uppercase();
            if !AGGREGATE_FUNCTIONS.contains(&function.as_str()) {
                tracing::warn!(table = %self.table, column, "ignoring unsupported column function");
                return self;
            }
        }
        self.columns.push(ColumnSpec::Name(column.to_string()));
        self
    }

    /// Adds `(key, value)` pairs whose meaning depends on the operation.
    ///
    /// - SELECT: `key AS value`
    /// - UPDATE, INSERT, REPLACE: `key = literal`, string values trimmed
    /// - DELETE: ignored
    pub fn columns_map<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in pairs {
            let key = key.into();
            let value = value.into();
            let spec = match self.operation {
                Operation::Select => ColumnSpec::Aliased {
                    expr: key,
                    alias: value.to_string(),
                },
                op if op.assigns() => {
                    let value = match value {
                        Value::String(s) => Value::String(s.trim().to_string()),
                        other => other,
                    };
                    ColumnSpec::Assign {
                        column: key,
                        literal: value.to_sql_literal(),
                    }
                }
                _ => {
                    tracing::warn!(table = %self.table, column = %key, "DELETE ignores column pairs");
                    continue;
                }
            };
            self.columns.push(spec);
        }
        self
    }

    fn aggregate(mut self, function: &str, column: &str, alias: Option<&str>) -> Self {
        let expr = format!("{function}({})", column.trim());
        match alias {
            Some(alias) => self.columns.push(ColumnSpec::Aliased {
                expr,
                alias: alias.to_string(),
            }),
            None => self.columns.push(ColumnSpec::Name(expr)),
        }
        self
    }

    /// Adds `AVG(column)`, optionally aliased.
    pub fn avg(self, column: &str, alias: Option<&str>) -> Self {
        self.aggregate("AVG", column, alias)
    }

    /// Adds `MIN(column)`, optionally aliased.
    pub fn min(self, column: &str, alias: Option<&str>) -> Self {
        self.aggregate("MIN", column, alias)
    }

    /// Adds `MAX(column)`, optionally aliased.
    pub fn max(self, column: &str, alias: Option<&str>) -> Self {
        self.aggregate("MAX", column, alias)
    }

    /// Adds `SUM(column)`, optionally aliased.
    pub fn sum(self, column: &str, alias: Option<&str>) -> Self {
        self.aggregate("SUM", column, alias)
    }

    /// Adds `COUNT(column)`, optionally aliased.
    pub fn count(self, column: &str, alias: Option<&str>) -> Self {
        self.aggregate("COUNT", column, alias)
    }

    /// Adds an `IF(condition,when_true,when_false)` column, optionally aliased.
    pub fn if_(mut self, condition: &str, when_true: &str, when_false: &str, alias: Option<&str>) -> Self {
        let expr = format!("IF({condition},{when_true},{when_false})");
        match alias {
            Some(alias) => self.columns.push(ColumnSpec::Aliased {
                expr,
                alias: alias.to_string(),
            }),
            None => self.columns.push(ColumnSpec::Name(expr)),
        }
        self
    }

    /// Adds a `WHEN condition THEN result` arm to the CASE column.
    ///
    /// All arms render as one `CASE ... END` expression after the columns.
    pub fn case(mut self, condition: impl Into<Condition>, result: impl Into<Value>) -> Self {
        self.cases.push(CaseWhen::new(condition, result));
        self
    }

    // ── Grouping and ordering ─────────────────────────────────────────

    /// Adds a GROUP BY term.
    pub fn group_by(mut self, term: &str) -> Self {
        let term = term.trim();
        if !term.is_empty() {
            self.group_by.push(term.to_string());
        }
        self
    }

    /// Adds a HAVING condition. Conditions are joined by `AND`.
    pub fn having(mut self, condition: impl Into<Condition>) -> Self {
        self.having.push(condition.into());
        self
    }

    /// Adds an ORDER BY term, e.g. `"OrderID DESC"`.
    pub fn order_by(mut self, term: &str) -> Self {
        let term = term.trim();
        if !term.is_empty() {
            self.order_by.push(term.to_string());
        }
        self
    }

    // ── WHERE ─────────────────────────────────────────────────────────

    fn push_where(mut self, connective: Connective, condition: Condition) -> Self {
        let connective = (!self.wheres.is_empty()).then_some(connective);
        self.wheres.push(WhereTerm {
            connective,
            condition,
        });
        self
    }

    /// Adds a where-term. Terms after the first are joined with `AND`.
    pub fn where_(self, condition: impl Into<Condition>) -> Self {
        self.push_where(Connective::And, condition.into())
    }

    /// Adds a where-term joined with `AND`.
    pub fn and_where(self, condition: impl Into<Condition>) -> Self {
        self.push_where(Connective::And, condition.into())
    }

    /// Adds a where-term joined with `OR`. As the first term it stands alone.
    pub fn or_where(self, condition: impl Into<Condition>) -> Self {
        self.push_where(Connective::Or, condition.into())
    }

    /// Appends already-built where-terms, keeping their connectives.
    pub(crate) fn where_terms(mut self, terms: impl IntoIterator<Item = WhereTerm>) -> Self {
        for term in terms {
            self = self.push_where(
                term.connective.unwrap_or(Connective::And),
                term.condition,
            );
        }
        self
    }

    // ── JOIN ──────────────────────────────────────────────────────────

    /// Adds a join of any type. The alias defaults to the table's first
    /// character. An empty table or condition is a usage error.
    pub fn join_with(
        mut self,
        join_type: JoinType,
        table: &str,
        on: impl Into<Condition>,
        alias: Option<&str>,
    ) -> DbalResult<Self> {
        let on = on.into();
        if table.trim().is_empty() || on.is_empty() {
            return Err(DbalError::UsageError(
                "join: missing table name or condition".to_string(),
            ));
        }
        self.joins.push(Join::new(join_type, table, alias, &on));
        Ok(self)
    }

    /// Adds an `INNER JOIN`, aliased as `alias` or by the table's first
    /// character.
    pub fn join(
        self,
        table: &str,
        on: impl Into<Condition>,
        alias: Option<&str>,
    ) -> DbalResult<Self> {
        self.join_with(JoinType::Inner, table, on, alias)
    }

    /// Adds an `INNER JOIN`.
    pub fn inner_join(
        self,
        table: &str,
        on: impl Into<Condition>,
        alias: Option<&str>,
    ) -> DbalResult<Self> {
        self.join_with(JoinType::Inner, table, on, alias)
    }

    /// Adds a `LEFT JOIN`.
    pub fn left_join(
        self,
        table: &str,
        on: impl Into<Condition>,
        alias: Option<&str>,
    ) -> DbalResult<Self> {
        self.join_with(JoinType::Left, table, on, alias)
    }

    /// Adds a `RIGHT JOIN`.
    pub fn right_join(
        self,
        table: &str,
        on: impl Into<Condition>,
        alias: Option<&str>,
    ) -> DbalResult<Self> {
        self.join_with(JoinType::Right, table, on, alias)
    }

    /// Adds an `OUTER JOIN`.
    pub fn outer_join(
        self,
        table: &str,
        on: impl Into<Condition>,
        alias: Option<&str>,
    ) -> DbalResult<Self> {
        self.join_with(JoinType::Outer, table, on, alias)
    }

    fn extend_join(mut self, connective: Option<Connective>, on: Condition) -> Self {
        if on.is_empty() {
            tracing::warn!(table = %self.table, "ignoring empty ON condition");
            return self;
        }
        match self.joins.last_mut() {
            Some(join) => join.extend(connective, &on),
            None => tracing::warn!(table = %self.table, "ON condition without a join ignored"),
        }
        self
    }

    /// Appends a condition to the most recent join, space-separated.
    pub fn on(self, condition: impl Into<Condition>) -> Self {
        self.extend_join(None, condition.into())
    }

    /// Appends `AND condition` to the most recent join.
    pub fn and_on(self, condition: impl Into<Condition>) -> Self {
        self.extend_join(Some(Connective::And), condition.into())
    }

    /// Appends `OR condition` to the most recent join.
    pub fn or_on(self, condition: impl Into<Condition>) -> Self {
        self.extend_join(Some(Connective::Or), condition.into())
    }

    // ── LIMIT and flags ───────────────────────────────────────────────

    /// Sets both offset and limit.
    pub fn offset_limits(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    /// Sets the offset. Rendered only together with a limit.
    pub fn set_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets the limit.
    pub fn set_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Adds `SQL_CALC_FOUND_ROWS` to a SELECT.
    pub fn calc_found_rows(mut self) -> Self {
        self.calc_found_rows = true;
        self
    }

    /// Adds `DISTINCT` to a SELECT.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ── Rendering ─────────────────────────────────────────────────────

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// An INSERT, REPLACE or UPDATE without assignments, or with column
    /// entries that are not assignments, is a usage error.
    pub fn to_sql(&self) -> DbalResult<String> {
        let sql = match self.operation {
            Operation::Select => self.render_select(),
            Operation::Delete => {
                let mut parts = vec![format!("DELETE FROM {}", self.table)];
                parts.extend(self.where_fragment());
                parts.extend(self.limit_fragment());
                parts.join(" ")
            }
            Operation::Update => {
                if self.columns.is_empty() {
                    return Err(DbalError::UsageError(format!(
                        "UPDATE {}: no columns to set",
                        self.table
                    )));
                }
                if let Some(other) = self
                    .columns
                    .iter()
                    .find(|spec| !matches!(spec, ColumnSpec::Assign { .. }))
                {
                    return Err(DbalError::UsageError(format!(
                        "UPDATE {}: '{}' is not a column assignment",
                        self.table,
                        other.render()
                    )));
                }
                let mut parts = vec![format!(
                    "UPDATE {} SET {}",
                    self.table,
                    self.render_columns()
                )];
                parts.extend(self.where_fragment());
                parts.extend(self.limit_fragment());
                parts.join(" ")
            }
            Operation::Insert | Operation::Replace => self.render_insert()?,
        };
        tracing::debug!(sql = %sql, "rendered statement");
        Ok(sql)
    }

    fn render_columns(&self) -> String {
        if self.columns.is_empty() {
            return "*".to_string();
        }
        self.columns
            .iter()
            .map(ColumnSpec::render)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn render_select(&self) -> String {
        let mut parts = vec!["SELECT".to_string()];
        if self.calc_found_rows {
            parts.push("SQL_CALC_FOUND_ROWS".to_string());
        }
        if self.distinct {
            parts.push("DISTINCT".to_string());
        }

        let mut columns = self.render_columns();
        if !self.cases.is_empty() {
            let arms: Vec<String> = self.cases.iter().map(CaseWhen::render).collect();
            columns.push_str(&format!(", CASE {} END", arms.join(" ")));
        }
        parts.push(columns);

        match &self.alias {
            Some(alias) => parts.push(format!("FROM {} AS {alias}", self.table)),
            None => parts.push(format!("FROM {}", self.table)),
        }
        parts.extend(self.joins.iter().map(Join::render));
        parts.extend(self.where_fragment());
        if !self.group_by.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by.join(", ")));
        }
        if !self.having.is_empty() {
            let terms: Vec<String> = self.having.iter().map(Condition::render).collect();
            parts.push(format!("HAVING {}", terms.join(" AND ")));
        }
        if !self.order_by.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by.join(", ")));
        }
        parts.extend(self.limit_fragment());
        parts.join(" ")
    }

    fn render_insert(&self) -> DbalResult<String> {
        let keyword = self.operation.keyword();
        let mut fields = Vec::with_capacity(self.columns.len());
        let mut values = Vec::with_capacity(self.columns.len());
        for spec in &self.columns {
            match spec {
                ColumnSpec::Assign { column, literal } => {
                    fields.push(column.as_str());
                    values.push(literal.as_str());
                }
                other => {
                    return Err(DbalError::UsageError(format!(
                        "{keyword} INTO {}: '{}' is not a column assignment",
                        self.table,
                        other.render()
                    )));
                }
            }
        }
        if fields.is_empty() {
            return Err(DbalError::UsageError(format!(
                "{keyword} INTO {}: no columns to insert",
                self.table
            )));
        }
        Ok(format!(
            "{keyword} INTO {} ({}) VALUES ({})",
            self.table,
            fields.join(", "),
            values.join(", ")
        ))
    }

    fn where_fragment(&self) -> Option<String> {
        (!self.wheres.is_empty()).then(|| format!("WHERE {}", render_where_terms(&self.wheres)))
    }

    fn limit_fragment(&self) -> Option<String> {
        let limit = self.limit.filter(|l| *l > 0)?;
        match self.offset.filter(|o| *o > 0) {
            Some(offset) => Some(format!("LIMIT {offset}, {limit}")),
            None => Some(format!("LIMIT {limit}")),
        }
    }
}

/// Renders the statement, or an empty string when [`Builder::to_sql`] fails.
impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_sql() {
            Ok(sql) => f.write_str(&sql),
            Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(table: &str) -> Builder {
        Builder::select(table, None).unwrap()
    }

    // ── Entry points ────────────────────────────────────────────────

    #[test]
    fn test_empty_table_is_usage_error() {
        for result in [
            Builder::select("", None),
            Builder::update("  ", None),
            Builder::insert("", Some("u")),
            Builder::delete("", None),
            Builder::replace("", None),
        ] {
            assert!(result.unwrap_err().is_usage_error());
        }
    }

    #[test]
    fn test_select_star() {
        assert_eq!(select("m_user").to_sql().unwrap(), "SELECT * FROM m_user");
    }

    #[test]
    fn test_from_table_appears_once() {
        for table in ["Orders", "m_user", "Customers"] {
            let sql = select(table)
                .where_(("a", "=", 1))
                .join("t2", ("a", "=", "b"), None)
                .unwrap()
                .to_sql()
                .unwrap();
            assert_eq!(sql.matches(&format!("FROM {table}")).count(), 1);
        }
    }

    #[test]
    fn test_select_alias() {
        let sql = Builder::select("m_user", Some("u")).unwrap().to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM m_user AS u");
    }

    // ── Columns ─────────────────────────────────────────────────────

    #[test]
    fn test_columns_comma_list() {
        let sql = select("t").columns("a, b ,c").to_sql().unwrap();
        assert_eq!(sql, "SELECT a, b, c FROM t");
    }

    #[test]
    fn test_columns_single_and_aggregate() {
        let sql = select("t").columns("a").columns("COUNT(id)").to_sql().unwrap();
        assert_eq!(sql, "SELECT a, COUNT(id) FROM t");
    }

    #[test]
    fn test_columns_unknown_function_ignored() {
        let sql = select("t").columns("CONCAT(a)").to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM t");
    }

    #[test]
    fn test_columns_map_select_aliases() {
        let sql = select("t")
            .columns_map([("a", "hello"), ("b", "test")])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT a AS hello, b AS test FROM t");
    }

    #[test]
    fn test_columns_map_update_assignments() {
        let sql = Builder::update("m_user", Some("u"))
            .unwrap()
            .columns_map([("a", "hello "), ("b", "test "), ("c", " 123 ")])
            .where_(("a", "like", "teeee"))
            .set_limit(10)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "UPDATE m_user SET a = 'hello', b = 'test', c = 123 WHERE a like 'teeee' LIMIT 10"
        );
    }

    #[test]
    fn test_columns_map_ignored_for_delete() {
        let sql = Builder::delete("t", None)
            .unwrap()
            .columns_map([("a", 1)])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "DELETE FROM t");
    }

    #[test]
    fn test_aggregates() {
        let sql = select("Orders")
            .avg("Freight", Some("avg_freight"))
            .min("Freight", None)
            .max("Freight", None)
            .sum("Freight", Some("total"))
            .count("*", Some("count"))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT AVG(Freight) AS avg_freight, MIN(Freight), MAX(Freight), \
             SUM(Freight) AS total, COUNT(*) AS count FROM Orders"
        );
    }

    #[test]
    fn test_if_column() {
        let sql = select("tbl_transaction")
            .columns("id")
            .if_("action_type='Income'", "action_amount", "0", Some("income"))
            .if_("a", "b", "c", None)
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT id, IF(action_type='Income',action_amount,0) AS income, IF(a,b,c) FROM tbl_transaction"
        );
    }

    #[test]
    fn test_case_column() {
        let sql = select("OrderDetails")
            .columns("OrderID, Quantity")
            .case(("Quantity", ">", 30), "over 30")
            .case(("Quantity", "=", 30), "exactly 30")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT OrderID, Quantity, CASE WHEN Quantity > 30 THEN 'over 30' \
             WHEN Quantity = 30 THEN 'exactly 30' END FROM OrderDetails"
        );
    }

    // ── WHERE ───────────────────────────────────────────────────────

    #[test]
    fn test_where_in_call_order() {
        let sql = select("t").where_(("a", "=", 1)).where_(("b", "=", 2)).to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = 1 AND b = 2");
    }

    #[test]
    fn test_and_or_where() {
        let sql = select("t")
            .where_(("a", "like", "teeee"))
            .and_where(("beee", ">", "100"))
            .or_where(("b", "like", "02020202"))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM t WHERE a like 'teeee' AND beee > 100 OR b like 02020202"
        );
    }

    #[test]
    fn test_or_where_first_stands_alone() {
        let sql = select("t").or_where(("a", "=", 1)).to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE a = 1");
    }

    #[test]
    fn test_where_in_list() {
        let sql = select("m_user")
            .where_(("a", "IN", vec!["a", "b", "c", "d"]))
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT * FROM m_user WHERE a IN ('a','b','c','d')");
    }

    #[test]
    fn test_where_quotes_and_escapes() {
        let sql = select("t").where_(("column", "=", "it's")).to_sql().unwrap();
        assert_eq!(sql, r"SELECT * FROM t WHERE column = 'it\'s'");
    }

    // ── JOIN ────────────────────────────────────────────────────────

    #[test]
    fn test_join_on_appends_space_joined() {
        let sql = select("t")
            .join("t2", ("a", "=", "b"), None)
            .unwrap()
            .on(("c", "=", "d"))
            .to_sql()
            .unwrap();
        assert!(sql.contains("INNER JOIN t.t2 ON a = b c = d"), "{sql}");
    }

    #[test]
    fn test_and_on_or_on() {
        let sql = select("m_user")
            .left_join("m_address", ("u.id", "=", "m.user_id"), None)
            .unwrap()
            .and_on(("m.active", "=", "1"))
            .or_on(("m.primary", "=", "1"))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM m_user LEFT JOIN m.m_address ON u.id = m.user_id AND m.active = 1 OR m.primary = 1"
        );
    }

    #[test]
    fn test_on_extends_most_recent_join() {
        let sql = select("Orders")
            .join_with(JoinType::Inner, "Customers", ("o.CustomerID", "=", "c.CustomerID"), Some("c"))
            .unwrap()
            .right_join("Employees", ("o.EmployeeID", "=", "e.EmployeeID"), Some("e"))
            .unwrap()
            .and_on(("e.Active", "=", "1"))
            .outer_join("Shippers", ("o.ShipVia", "=", "s.ShipperID"), None)
            .unwrap()
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM Orders INNER JOIN c.Customers ON o.CustomerID = c.CustomerID \
             RIGHT JOIN e.Employees ON o.EmployeeID = e.EmployeeID AND e.Active = 1 \
             OUTER JOIN S.Shippers ON o.ShipVia = s.ShipperID"
        );
    }

    #[test]
    fn test_join_usage_errors() {
        assert!(select("t").join("", ("a", "=", "b"), None).unwrap_err().is_usage_error());
        assert!(select("t").join("t2", ("", "=", "b"), None).unwrap_err().is_usage_error());
    }

    #[test]
    fn test_on_without_join_is_ignored() {
        let sql = select("t").on(("a", "=", "b")).to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM t");
    }

    // ── GROUP BY / HAVING / ORDER BY ────────────────────────────────

    #[test]
    fn test_group_having_order() {
        let sql = select("Orders")
            .columns("EmployeeID")
            .count("*", Some("orders"))
            .group_by("EmployeeID")
            .having(("COUNT(*)", ">", 5))
            .having(("EmployeeID", "<>", 2))
            .order_by("orders DESC")
            .order_by("EmployeeID")
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT EmployeeID, COUNT(*) AS orders FROM Orders GROUP BY EmployeeID \
             HAVING COUNT(*) > 5 AND EmployeeID <> 2 ORDER BY orders DESC, EmployeeID"
        );
    }

    // ── LIMIT ───────────────────────────────────────────────────────

    #[test]
    fn test_offset_limits() {
        let sql = select("t").offset_limits(10, 5).to_sql().unwrap();
        assert!(sql.ends_with("LIMIT 10, 5"), "{sql}");
    }

    #[test]
    fn test_set_limit_only() {
        let sql = select("t").set_limit(5).to_sql().unwrap();
        assert!(sql.ends_with("LIMIT 5"), "{sql}");
    }

    #[test]
    fn test_zero_offset_is_unset() {
        let sql = select("t").offset_limits(0, 5).to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM t LIMIT 5");
    }

    #[test]
    fn test_offset_without_limit_renders_nothing() {
        let sql = select("t").set_offset(10).to_sql().unwrap();
        assert_eq!(sql, "SELECT * FROM t");
    }

    // ── Flags ───────────────────────────────────────────────────────

    #[test]
    fn test_calc_found_rows_and_distinct() {
        let sql = select("t")
            .distinct()
            .calc_found_rows()
            .columns("a")
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT SQL_CALC_FOUND_ROWS DISTINCT a FROM t");
    }

    // ── Other operations ────────────────────────────────────────────

    #[test]
    fn test_delete() {
        let sql = Builder::delete("m_user", Some("u"))
            .unwrap()
            .where_(("b", ">", 20))
            .set_limit(10)
            .to_sql()
            .unwrap();
        assert_eq!(sql, "DELETE FROM m_user WHERE b > 20 LIMIT 10");
    }

    #[test]
    fn test_update_without_columns_is_error() {
        let builder = Builder::update("t", None).unwrap();
        assert!(builder.to_sql().unwrap_err().is_usage_error());
        assert_eq!(builder.to_string(), "");
    }

    #[test]
    fn test_update_rejects_bare_columns() {
        let builder = Builder::update("t", None).unwrap().columns("a, b");
        let err = builder.to_sql().unwrap_err();
        assert!(err.is_usage_error());
        assert!(err.to_string().contains("'a' is not a column assignment"), "{err}");
        assert_eq!(builder.to_string(), "");
    }

    #[test]
    fn test_insert() {
        let sql = Builder::insert("m_user", Some("u"))
            .unwrap()
            .columns_map([("a", "hello "), ("b", "test "), ("c", " 123 ")])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "INSERT INTO m_user (a, b, c) VALUES ('hello', 'test', 123)");
    }

    #[test]
    fn test_replace_uses_insert_layout() {
        let sql = Builder::replace("m_user", None)
            .unwrap()
            .columns_map([("id", Value::Int(1)), ("name", Value::from("x"))])
            .to_sql()
            .unwrap();
        assert_eq!(sql, "REPLACE INTO m_user (id, name) VALUES (1, 'x')");
    }

    #[test]
    fn test_insert_mismatch_is_error_and_displays_empty() {
        let builder = Builder::insert("t", None).unwrap().columns("a, b");
        assert!(builder.to_sql().unwrap_err().is_usage_error());
        assert_eq!(builder.to_string(), "");

        let empty = Builder::insert("t", None).unwrap();
        assert!(empty.to_sql().is_err());
    }

    // ── Purity ──────────────────────────────────────────────────────

    #[test]
    fn test_rendering_is_idempotent() {
        let builder = Builder::select("m_user", Some("u"))
            .unwrap()
            .where_(("a", "IN", vec!["a", "b"]))
            .join("m_address", ("left column", "=", "right column"), None)
            .unwrap()
            .and_on(("a", "=", "b"))
            .columns_map([("a", "hello"), ("b", "test"), ("c", "123")])
            .avg("text", Some("help"))
            .case(("jee", ">", "100"), "This is a test")
            .order_by("Column DESC")
            .offset_limits(100, 100);
        let first = builder.to_sql().unwrap();
        assert_eq!(first, builder.to_sql().unwrap());
        assert_eq!(first, builder.to_string());
    }
}
