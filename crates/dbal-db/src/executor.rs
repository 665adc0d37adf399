//! The database collaborator interface and model write helpers.
//!
//! [`DbExecutor`] is the only bridge between the query layer and a
//! database. Rendered SQL text is all that crosses it; how the statement is
//! carried to the database (embedded driver, wire protocol, pool) is the
//! implementor's business. Backends live in the `dbal-db-backends` crate.
//!
//! [`RowSet`] is the handle a [`Cursor`](crate::query::Cursor) walks. It is
//! owned by exactly one cursor and released when the cursor is exhausted or
//! dropped.

use std::sync::Arc;

use dbal_core::{DbalError, DbalResult};

use crate::model::Model;
use crate::query::builder::Builder;
use crate::row::Row;
use crate::value::Value;

/// How the result of a statement should be returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultMode {
    /// A row set for SELECTs; statements without result columns report
    /// the number of affected rows instead.
    #[default]
    RowSet,
    /// The first column of the first row, as a count.
    ScalarCount,
    /// The identifier generated by an INSERT.
    LastInsertId,
}

/// The outcome of one executed statement.
pub enum QueryOutcome {
    /// A row set to be walked by a cursor.
    Rows(Box<dyn RowSet>),
    /// A scalar count.
    Count(u64),
    /// The last generated identifier.
    InsertId(Value),
    /// The number of rows changed by an UPDATE/INSERT/DELETE.
    Affected(u64),
}

impl std::fmt::Debug for QueryOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rows(rows) => write!(f, "Rows({} rows)", rows.row_count()),
            Self::Count(n) => write!(f, "Count({n})"),
            Self::InsertId(v) => write!(f, "InsertId({v:?})"),
            Self::Affected(n) => write!(f, "Affected({n})"),
        }
    }
}

impl QueryOutcome {
    /// Unwraps a row set.
    pub fn into_rows(self) -> DbalResult<Box<dyn RowSet>> {
        match self {
            Self::Rows(rows) => Ok(rows),
            other => Err(unexpected("a row set", &other)),
        }
    }

    /// Unwraps a count.
    pub fn into_count(self) -> DbalResult<u64> {
        match self {
            Self::Count(n) => Ok(n),
            other => Err(unexpected("a count", &other)),
        }
    }

    /// Unwraps a generated identifier.
    pub fn into_insert_id(self) -> DbalResult<Value> {
        match self {
            Self::InsertId(v) => Ok(v),
            other => Err(unexpected("an insert id", &other)),
        }
    }

    /// Unwraps an affected-row count.
    pub fn into_affected(self) -> DbalResult<u64> {
        match self {
            Self::Affected(n) => Ok(n),
            other => Err(unexpected("an affected-row count", &other)),
        }
    }
}

fn unexpected(expected: &str, got: &QueryOutcome) -> DbalError {
    DbalError::DatabaseError(format!("Expected {expected} from the database, got {got:?}"))
}

/// A forward-only, seekable set of result rows.
pub trait RowSet: Send {
    /// Total number of rows in the set.
    fn row_count(&self) -> usize;

    /// Returns the next row, or `None` once the set is exhausted.
    fn fetch_next(&mut self) -> DbalResult<Option<Row>>;

    /// Positions the set so the next fetch returns row `offset`.
    /// Returns `false` if `offset` is out of range.
    fn seek(&mut self, offset: usize) -> bool;

    /// Releases the underlying handle. Further fetches return `None`.
    fn release(&mut self);
}

/// A [`RowSet`] over rows already fetched into memory.
#[derive(Debug, Default)]
pub struct BufferedRowSet {
    rows: Vec<Row>,
    position: usize,
    released: bool,
}

impl BufferedRowSet {
    /// Wraps the given rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            position: 0,
            released: false,
        }
    }

    /// Whether [`release`](RowSet::release) has been called.
    pub const fn is_released(&self) -> bool {
        self.released
    }
}

impl RowSet for BufferedRowSet {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn fetch_next(&mut self) -> DbalResult<Option<Row>> {
        if self.released {
            return Ok(None);
        }
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    fn seek(&mut self, offset: usize) -> bool {
        if self.released || offset >= self.rows.len() {
            return false;
        }
        self.position = offset;
        true
    }

    fn release(&mut self) {
        self.rows.clear();
        self.position = 0;
        self.released = true;
    }
}

/// Synchronous database executor.
///
/// Calls block until the database answers. Implementations must be
/// `Send + Sync`; a connection shared between threads serialises access
/// internally.
pub trait DbExecutor: Send + Sync {
    /// The shard this executor is connected to.
    fn shard(&self) -> &str;

    /// Executes one rendered statement.
    fn execute(&self, sql: &str, mode: ResultMode) -> DbalResult<QueryOutcome>;

    /// Executes a batch of statements, such as DDL or fixtures.
    fn execute_batch(&self, sql: &str) -> DbalResult<()>;

    /// The resolver used to reach other shards while loading relations.
    /// A plain connection has none and only serves its own shard.
    fn resolver(&self) -> Option<&dyn ShardResolver> {
        None
    }
}

/// Hands out the executor serving a shard key.
pub trait ShardResolver: Send + Sync {
    /// Returns the executor for `shard`.
    fn resolve(&self, shard: &str) -> DbalResult<Arc<dyn DbExecutor>>;
}

/// An executor that carries a [`ShardResolver`], so relations declared on
/// other shards are loaded from their own connection.
pub struct RoutedExecutor<'r> {
    inner: Arc<dyn DbExecutor>,
    resolver: &'r dyn ShardResolver,
}

impl<'r> RoutedExecutor<'r> {
    /// Wraps `inner`, resolving foreign shards through `resolver`.
    pub fn new(inner: Arc<dyn DbExecutor>, resolver: &'r dyn ShardResolver) -> Self {
        Self { inner, resolver }
    }

    /// The wrapped connection.
    pub fn inner(&self) -> &Arc<dyn DbExecutor> {
        &self.inner
    }
}

impl DbExecutor for RoutedExecutor<'_> {
    fn shard(&self) -> &str {
        self.inner.shard()
    }

    fn execute(&self, sql: &str, mode: ResultMode) -> DbalResult<QueryOutcome> {
        self.inner.execute(sql, mode)
    }

    fn execute_batch(&self, sql: &str) -> DbalResult<()> {
        self.inner.execute_batch(sql)
    }

    fn resolver(&self) -> Option<&dyn ShardResolver> {
        Some(self.resolver)
    }
}

impl std::fmt::Debug for RoutedExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutedExecutor")
            .field("shard", &self.inner.shard())
            .finish_non_exhaustive()
    }
}

// ── Model write helpers ───────────────────────────────────────────────

/// Inserts a row for `M` and returns the generated identifier.
///
/// # Errors
///
/// Returns a usage error if `values` is empty, or the database error if the
/// INSERT fails.
pub fn create_model<M, I, K, V>(values: I, db: &dyn DbExecutor) -> DbalResult<Value>
where
    M: Model,
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let sql = Builder::insert(M::table_name(), None)?
        .columns_map(values)
        .to_sql()?;
    let id = db.execute(&sql, ResultMode::LastInsertId)?.into_insert_id()?;
    tracing::debug!(table = M::table_name(), id = %id, "created row");
    Ok(id)
}

/// Deletes the row backing `model`, matched on its identifier.
///
/// A model whose identifier is blank (see [`Value::is_blank`]) was never
/// stored; nothing is sent and `0` is returned.
///
/// # Errors
///
/// Returns an error if the model has no ID column or the DELETE fails.
pub fn delete_model<M: Model>(model: &M, db: &dyn DbExecutor) -> DbalResult<u64> {
    let id = model.id();
    if id.is_blank() {
        tracing::debug!(table = M::table_name(), "skipping delete of unsaved model");
        return Ok(0);
    }
    let id_field = M::id_field()?;
    let sql = Builder::delete(M::table_name(), None)?
        .where_((id_field.name(), "=", id))
        .to_sql()?;
    db.execute(&sql, ResultMode::RowSet)?.into_affected()
}
