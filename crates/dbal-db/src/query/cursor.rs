//! The lazy result cursor.
//!
//! A [`Cursor`] runs its query set's SELECT on first access, then hands each
//! fetched row to the [`DataMapper`]. States:
//!
//! ```text
//! Unexecuted --first next()/row_count()--> Executed --last row--> Exhausted
//! ```
//!
//! The row set is released when the cursor reaches the end, when execution
//! fails, and when the cursor is dropped early.

use std::mem;

use dbal_core::DbalResult;

use super::queryset::QuerySet;
use crate::executor::{DbExecutor, ResultMode, RowSet};
use crate::model::{DataMapper, Model};

enum CursorState {
    Unexecuted,
    Executed(Box<dyn RowSet>),
    Exhausted,
}

/// A single-execution, forward iterator over hydrated models.
///
/// Yields `DbalResult<M>`: execution and hydration failures surface as
/// items rather than ending iteration silently.
pub struct Cursor<'a, M: Model> {
    queryset: &'a QuerySet<M>,
    db: &'a dyn DbExecutor,
    state: CursorState,
    position: usize,
    row_count: usize,
}

impl<'a, M: Model> Cursor<'a, M> {
    pub(crate) fn new(queryset: &'a QuerySet<M>, db: &'a dyn DbExecutor) -> Self {
        Self {
            queryset,
            db,
            state: CursorState::Unexecuted,
            position: 0,
            row_count: 0,
        }
    }

    /// Number of rows handed out so far.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Total rows in the result, executing the query if needed.
    pub fn row_count(&mut self) -> DbalResult<usize> {
        self.ensure_executed()?;
        Ok(self.row_count)
    }

    /// Whether the query has run.
    pub const fn is_executed(&self) -> bool {
        !matches!(self.state, CursorState::Unexecuted)
    }

    /// Whether every row has been handed out and the row set released.
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.state, CursorState::Exhausted)
    }

    fn ensure_executed(&mut self) -> DbalResult<()> {
        if !matches!(self.state, CursorState::Unexecuted) {
            return Ok(());
        }
        let result = self
            .queryset
            .to_sql()
            .and_then(|sql| self.db.execute(&sql, ResultMode::RowSet))
            .and_then(crate::executor::QueryOutcome::into_rows);
        match result {
            Ok(rows) => {
                self.row_count = rows.row_count();
                tracing::debug!(
                    table = M::table_name(),
                    rows = self.row_count,
                    "cursor executed"
                );
                self.state = CursorState::Executed(rows);
                Ok(())
            }
            Err(e) => {
                self.state = CursorState::Exhausted;
                Err(e)
            }
        }
    }

    fn finish(&mut self) {
        if let CursorState::Executed(mut rows) = mem::replace(&mut self.state, CursorState::Exhausted) {
            rows.release();
            tracing::debug!(table = M::table_name(), position = self.position, "cursor released");
        }
    }
}

impl<M: Model> Iterator for Cursor<'_, M> {
    type Item = DbalResult<M>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.ensure_executed() {
            return Some(Err(e));
        }
        let CursorState::Executed(rows) = &mut self.state else {
            return None;
        };
        match rows.fetch_next() {
            Ok(Some(row)) => {
                self.position += 1;
                let item = DataMapper::hydrate::<M>(&row, self.db);
                if self.position >= self.row_count {
                    self.finish();
                }
                Some(item)
            }
            Ok(None) => {
                self.finish();
                None
            }
            Err(e) => {
                self.finish();
                Some(Err(e))
            }
        }
    }
}

impl<M: Model> Drop for Cursor<'_, M> {
    fn drop(&mut self) {
        self.finish();
    }
}
