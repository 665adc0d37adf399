//! SQLite collaborator using `rusqlite`.
//!
//! [`SqliteBackend`] implements [`DbExecutor`] over one `rusqlite`
//! connection. Calls block; the connection sits behind a `Mutex`, so a
//! backend can be shared between threads through an `Arc`.
//!
//! Features:
//! - WAL mode and foreign-key enforcement enabled on open
//! - In-memory database support via `:memory:` path (great for testing)
//! - `CREATE TABLE` generation from [`ModelMeta`]
//! - Per-connection [`QueryStats`]

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use dbal_core::logging::query_span;
use dbal_core::settings::DEFAULT_SHARD;
use dbal_core::{DbalError, DbalResult};
use dbal_db::executor::{BufferedRowSet, DbExecutor, QueryOutcome, ResultMode};
use dbal_db::model::{Model, ModelMeta};
use dbal_db::row::Row;
use dbal_db::value::Value;

use crate::stats::{QueryStats, QueryStatsSnapshot};

const MEMORY_PATH: &str = ":memory:";

/// A SQLite database connection serving one shard.
pub struct SqliteBackend {
    shard: String,
    path: PathBuf,
    conn: Mutex<rusqlite::Connection>,
    stats: QueryStats,
}

impl SqliteBackend {
    /// Opens a SQLite database at the given path for `shard`.
    ///
    /// If the path is `:memory:`, an in-memory database is created.
    ///
    /// # Errors
    ///
    /// Returns [`DbalError::OperationalError`] if the database cannot be
    /// opened or configured.
    pub fn open(shard: impl Into<String>, path: impl Into<PathBuf>) -> DbalResult<Self> {
        let shard = shard.into();
        let path = path.into();
        let conn = if path.as_os_str() == MEMORY_PATH {
            rusqlite::Connection::open_in_memory()
        } else {
            rusqlite::Connection::open(&path)
        }
        .map_err(|e| DbalError::OperationalError(format!("SQLite open failed: {e}")))?;

        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .and_then(|_| conn.pragma_update(None, "foreign_keys", "ON"))
            .map_err(|e| DbalError::OperationalError(format!("Failed to set pragmas: {e}")))?;

        tracing::info!(shard = %shard, path = %path.display(), "opened SQLite connection");
        Ok(Self {
            shard,
            path,
            conn: Mutex::new(conn),
            stats: QueryStats::new(),
        })
    }

    /// Opens an in-memory database on the default shard.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn memory() -> DbalResult<Self> {
        Self::open(DEFAULT_SHARD, MEMORY_PATH)
    }

    /// Returns the database file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the statement counters of this connection.
    pub fn stats(&self) -> QueryStatsSnapshot {
        self.stats.snapshot()
    }

    /// Resets the statement counters.
    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    /// Creates the table backing `M` if it does not exist.
    pub fn create_table<M: Model>(&self) -> DbalResult<()> {
        self.execute_batch(&create_table_sql(M::meta()))
    }

    fn lock(&self) -> DbalResult<MutexGuard<'_, rusqlite::Connection>> {
        self.conn
            .lock()
            .map_err(|_| DbalError::OperationalError("SQLite connection lock poisoned".to_string()))
    }

    fn run(&self, sql: &str, mode: ResultMode) -> DbalResult<QueryOutcome> {
        let conn = self.lock()?;
        match mode {
            ResultMode::RowSet => {
                let mut stmt = conn.prepare(sql).map_err(database_error)?;
                if stmt.column_count() == 0 {
                    let affected = stmt.execute([]).map_err(database_error)?;
                    return Ok(QueryOutcome::Affected(
                        u64::try_from(affected).unwrap_or(u64::MAX),
                    ));
                }
                let columns: Vec<String> = stmt
                    .column_names()
                    .into_iter()
                    .map(String::from)
                    .collect();
                let mut raw_rows = stmt.query([]).map_err(database_error)?;
                let mut rows = Vec::new();
                while let Some(row) = raw_rows.next().map_err(database_error)? {
                    rows.push(convert_row(row, &columns));
                }
                Ok(QueryOutcome::Rows(Box::new(BufferedRowSet::new(rows))))
            }
            ResultMode::ScalarCount => {
                let count: i64 = conn
                    .query_row(sql, [], |row| row.get(0))
                    .map_err(database_error)?;
                Ok(QueryOutcome::Count(u64::try_from(count).unwrap_or(0)))
            }
            ResultMode::LastInsertId => {
                conn.execute(sql, []).map_err(database_error)?;
                Ok(QueryOutcome::InsertId(Value::Int(conn.last_insert_rowid())))
            }
        }
    }
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("shard", &self.shard)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl DbExecutor for SqliteBackend {
    fn shard(&self) -> &str {
        &self.shard
    }

    fn execute(&self, sql: &str, mode: ResultMode) -> DbalResult<QueryOutcome> {
        let span = query_span(&self.shard);
        let _guard = span.enter();
        let started = Instant::now();

        let result = self.run(sql, mode);
        let elapsed = started.elapsed();
        let (rows, affected) = match &result {
            Ok(QueryOutcome::Rows(rows)) => (rows.row_count(), 0),
            Ok(QueryOutcome::Affected(n)) => (0, *n),
            _ => (0, 0),
        };
        self.stats.record(elapsed, rows, affected, result.is_err());

        match &result {
            Ok(outcome) => tracing::debug!(
                sql,
                ?mode,
                ?outcome,
                elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
                "statement executed"
            ),
            Err(e) => tracing::warn!(sql, error = %e, "statement failed"),
        }
        result
    }

    fn execute_batch(&self, sql: &str) -> DbalResult<()> {
        let span = query_span(&self.shard);
        let _guard = span.enter();
        let started = Instant::now();
        let result = self.lock()?.execute_batch(sql).map_err(database_error);
        self.stats.record(started.elapsed(), 0, 0, result.is_err());
        if let Err(e) = &result {
            tracing::warn!(error = %e, "batch failed");
        }
        result
    }
}

/// Generates a `CREATE TABLE IF NOT EXISTS` statement from model metadata.
///
/// Foreign-key columns reference the primary key of their related table.
pub fn create_table_sql(meta: &ModelMeta) -> String {
    let columns: Vec<String> = meta
        .fields
        .iter()
        .map(|column| {
            let mut def = format!("{} {}", column.name(), column.kind().sql_type());
            if column.is_primary_key() {
                def.push_str(" PRIMARY KEY");
            }
            if let Some(related) = column.related_table() {
                def.push_str(&format!(" REFERENCES {related}"));
            }
            def
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        meta.table_name,
        columns.join(", ")
    )
}

fn database_error(e: rusqlite::Error) -> DbalError {
    DbalError::DatabaseError(e.to_string())
}

/// Converts a `rusqlite::Row` to our generic `Row`.
fn convert_row(sqlite_row: &rusqlite::Row<'_>, column_names: &[String]) -> Row {
    use rusqlite::types::ValueRef;

    let values: Vec<Value> = (0..column_names.len())
        .map(|i| match sqlite_row.get_ref(i).unwrap_or(ValueRef::Null) {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Int(v),
            ValueRef::Real(v) => Value::Float(v),
            ValueRef::Text(b) => Value::String(String::from_utf8_lossy(b).into_owned()),
            ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
        })
        .collect();

    Row::new(column_names.to_vec(), values)
}
