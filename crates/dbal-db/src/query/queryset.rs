//! Manager and QuerySet: per-model, caller-owned query accumulation.
//!
//! [`Manager`] holds no state; every finder call returns a fresh
//! [`QuerySet`]. A query set collects filters, ordering and limits through
//! consuming calls and touches the database only when a terminal method
//! (`count`, `get`, `at`, `first`, `all`, or iterating [`QuerySet::iter`])
//! runs.
//!
//! # Examples
//!
//! ```
//! use std::sync::LazyLock;
//!
//! use dbal_core::DbalResult;
//! use dbal_db::fields::Column;
//! use dbal_db::model::{Model, ModelMeta, Record};
//! use dbal_db::value::Value;
//!
//! struct Order {
//!     id: i64,
//! }
//!
//! impl Model for Order {
//!     fn meta() -> &'static ModelMeta {
//!         static META: LazyLock<ModelMeta> =
//!             LazyLock::new(|| ModelMeta::new("Orders", vec![Column::id("OrderID")]));
//!         &META
//!     }
//!     fn id(&self) -> Value {
//!         Value::Int(self.id)
//!     }
//!     fn from_record(record: &Record<'_>) -> DbalResult<Self> {
//!         Ok(Self { id: record.get("OrderID")? })
//!     }
//! }
//!
//! let sql = Order::objects()
//!     .find_one(11077)
//!     .filter_or(("ShipCity", "=", "Reims"))
//!     .to_sql()?;
//! assert_eq!(sql, "SELECT * FROM Orders WHERE OrderID = 11077 OR ShipCity = 'Reims'");
//! # Ok::<(), dbal_core::DbalError>(())
//! ```

use std::fmt;
use std::marker::PhantomData;

use dbal_core::{DbalError, DbalResult};

use super::builder::Builder;
use super::clause::{Condition, Connective, WhereTerm};
use super::cursor::Cursor;
use crate::executor::{create_model, DbExecutor, ResultMode};
use crate::model::{DataMapper, Model};
use crate::value::Value;

/// The entry point for model-level query operations.
///
/// The `Manager` itself does not hold any query state; it simply creates
/// fresh `QuerySet` instances.
pub struct Manager<M: Model> {
    _phantom: PhantomData<M>,
}

impl<M: Model> fmt::Debug for Manager<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("table", &M::table_name())
            .finish()
    }
}

impl<M: Model> Default for Manager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Manager<M> {
    /// Creates a new manager.
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    /// Returns an unfiltered `QuerySet`.
    pub fn find_all(&self) -> QuerySet<M> {
        QuerySet::new()
    }

    /// Returns a `QuerySet` matching `id_field = value`.
    ///
    /// A model without an ID column yields a query set that fails with
    /// [`DbalError::ImproperlyConfigured`] when executed.
    pub fn find_one(&self, value: impl Into<Value>) -> QuerySet<M> {
        match M::id_field() {
            Ok(column) => self.find_all().filter_and((column.name(), "=", value)),
            Err(e) => QuerySet {
                misconfigured: Some(e.to_string()),
                ..QuerySet::new()
            },
        }
    }

    /// Returns a `QuerySet` matching a full condition triple.
    pub fn find_one_where(&self, condition: impl Into<Condition>) -> QuerySet<M> {
        self.find_all().filter_and(condition)
    }

    /// Counts all rows of the model's table.
    pub fn count(&self, db: &dyn DbExecutor) -> DbalResult<u64> {
        self.find_all().count(db)
    }

    /// Inserts a row and returns the generated identifier.
    pub fn create<I, K, V>(&self, values: I, db: &dyn DbExecutor) -> DbalResult<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        create_model::<M, _, _, _>(values, db)
    }
}

/// A lazy accumulator of filter, order and limit criteria for one model.
///
/// Filters are applied in call order; the first carries no connective.
pub struct QuerySet<M: Model> {
    model: PhantomData<M>,
    filters: Vec<WhereTerm>,
    order_by: Vec<String>,
    offset: Option<u64>,
    limit: Option<u64>,
    misconfigured: Option<String>,
}

impl<M: Model> Clone for QuerySet<M> {
    fn clone(&self) -> Self {
        Self {
            model: PhantomData,
            filters: self.filters.clone(),
            order_by: self.order_by.clone(),
            offset: self.offset,
            limit: self.limit,
            misconfigured: self.misconfigured.clone(),
        }
    }
}

impl<M: Model> fmt::Debug for QuerySet<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuerySet")
            .field("table", &M::table_name())
            .field("filters", &self.filters)
            .field("order_by", &self.order_by)
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish()
    }
}

impl<M: Model> QuerySet<M> {
    pub(crate) const fn new() -> Self {
        Self {
            model: PhantomData,
            filters: Vec::new(),
            order_by: Vec::new(),
            offset: None,
            limit: None,
            misconfigured: None,
        }
    }

    fn push_filter(mut self, connective: Connective, condition: Condition) -> Self {
        let connective = (!self.filters.is_empty()).then_some(connective);
        self.filters.push(WhereTerm {
            connective,
            condition,
        });
        self
    }

    /// Adds a condition joined with `AND`.
    pub fn filter_and(self, condition: impl Into<Condition>) -> Self {
        self.push_filter(Connective::And, condition.into())
    }

    /// Adds a condition joined with `OR`.
    pub fn filter_or(self, condition: impl Into<Condition>) -> Self {
        self.push_filter(Connective::Or, condition.into())
    }

    /// Adds an ORDER BY term.
    pub fn order_by(mut self, term: &str) -> Self {
        self.order_by.push(term.to_string());
        self
    }

    /// Limits the number of rows.
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips `offset` rows. Only applied together with a limit.
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// The accumulated filters.
    pub fn filters(&self) -> &[WhereTerm] {
        &self.filters
    }

    fn check_configured(&self) -> DbalResult<()> {
        match &self.misconfigured {
            Some(reason) => Err(DbalError::ImproperlyConfigured(format!(
                "{}: {reason}",
                M::table_name()
            ))),
            None => Ok(()),
        }
    }

    /// The SELECT builder this query set executes.
    pub fn builder(&self) -> DbalResult<Builder> {
        self.check_configured()?;
        let mut builder = Builder::select(M::table_name(), None)?.where_terms(self.filters.clone());
        for term in &self.order_by {
            builder = builder.order_by(term);
        }
        if let Some(limit) = self.limit {
            builder = builder.set_limit(limit);
        }
        if let Some(offset) = self.offset {
            builder = builder.set_offset(offset);
        }
        Ok(builder)
    }

    /// The rendered SELECT.
    pub fn to_sql(&self) -> DbalResult<String> {
        self.builder()?.to_sql()
    }

    /// Counts matching rows with `SELECT COUNT(*) AS count`.
    ///
    /// Ordering and limits do not apply.
    pub fn count(&self, db: &dyn DbExecutor) -> DbalResult<u64> {
        self.check_configured()?;
        let sql = Builder::select(M::table_name(), None)?
            .count("*", Some("count"))
            .where_terms(self.filters.clone())
            .to_sql()?;
        db.execute(&sql, ResultMode::ScalarCount)?.into_count()
    }

    /// Returns a lazy cursor over the matching rows. Nothing is sent until
    /// the first item is requested.
    pub fn iter<'a>(&'a self, db: &'a dyn DbExecutor) -> Cursor<'a, M> {
        Cursor::new(self, db)
    }

    /// Executes the query afresh, seeks to `index` and hydrates that row.
    pub fn at(&self, index: usize, db: &dyn DbExecutor) -> DbalResult<Option<M>> {
        let sql = self.to_sql()?;
        let mut rows = db.execute(&sql, ResultMode::RowSet)?.into_rows()?;
        let result = if rows.seek(index) {
            rows.fetch_next()
                .and_then(|row| row.map(|row| DataMapper::hydrate::<M>(&row, db)).transpose())
        } else {
            Ok(None)
        };
        rows.release();
        result
    }

    /// Returns the single matching instance.
    ///
    /// Zero matches is `Ok(None)`; more than one is
    /// [`DbalError::MultipleObjectsReturned`]. Ordering and limits are
    /// ignored.
    pub fn get(&self, db: &dyn DbExecutor) -> DbalResult<Option<M>> {
        let scoped = Self {
            filters: self.filters.clone(),
            misconfigured: self.misconfigured.clone(),
            ..Self::new()
        };
        match scoped.count(db)? {
            0 => Ok(None),
            1 => scoped.at(0, db),
            n => Err(DbalError::MultipleObjectsReturned(format!(
                "{} matched {n} rows",
                M::table_name()
            ))),
        }
    }

    /// Returns the first matching instance.
    pub fn first(&self, db: &dyn DbExecutor) -> DbalResult<Option<M>> {
        self.iter(db).next().transpose()
    }

    /// Hydrates every matching row.
    pub fn all(&self, db: &dyn DbExecutor) -> DbalResult<Vec<M>> {
        self.iter(db).collect()
    }
}
