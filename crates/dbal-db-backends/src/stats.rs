//! Per-connection statement statistics.
//!
//! Every [`SqliteBackend`](crate::sqlite::SqliteBackend) keeps a
//! [`QueryStats`] that counts statements, failures, changed rows and time
//! spent. A
//! [`QueryStatsSnapshot`] is a plain copy for assertions and reporting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A point-in-time copy of [`QueryStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStatsSnapshot {
    /// Statements sent, including failed ones.
    pub statements: u64,
    /// Statements that returned an error.
    pub errors: u64,
    /// Rows handed back in row sets.
    pub rows_returned: u64,
    /// Rows changed by statements reporting an affected-row count.
    pub rows_affected: u64,
    /// Wall time spent executing, in microseconds.
    pub total_micros: u64,
}

impl QueryStatsSnapshot {
    /// Mean time per statement in microseconds, zero when nothing ran.
    pub const fn avg_micros(&self) -> u64 {
        match self.statements {
            0 => 0,
            n => self.total_micros / n,
        }
    }
}

/// Lock-free counters shared by all users of one connection.
#[derive(Debug, Default)]
pub struct QueryStats {
    statements: AtomicU64,
    errors: AtomicU64,
    rows_returned: AtomicU64,
    rows_affected: AtomicU64,
    total_micros: AtomicU64,
}

impl QueryStats {
    /// Fresh, zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one executed statement.
    pub fn record(&self, elapsed: Duration, rows: usize, affected: u64, failed: bool) {
        self.statements.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        self.rows_returned
            .fetch_add(u64::try_from(rows).unwrap_or(u64::MAX), Ordering::Relaxed);
        self.rows_affected.fetch_add(affected, Ordering::Relaxed);
        self.total_micros.fetch_add(
            u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            Ordering::Relaxed,
        );
    }

    /// Copies the current counters.
    pub fn snapshot(&self) -> QueryStatsSnapshot {
        QueryStatsSnapshot {
            statements: self.statements.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            rows_affected: self.rows_affected.load(Ordering::Relaxed),
            total_micros: self.total_micros.load(Ordering::Relaxed),
        }
    }

    /// Resets every counter to zero.
    pub fn reset(&self) {
        self.statements.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.rows_returned.store(0, Ordering::Relaxed);
        self.rows_affected.store(0, Ordering::Relaxed);
        self.total_micros.store(0, Ordering::Relaxed);
    }
}
