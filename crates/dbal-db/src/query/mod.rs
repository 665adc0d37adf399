//! Statement building and lazy query execution.
//!
//! - [`builder`] - The fluent SQL [`Builder`] for SELECT/UPDATE/INSERT/DELETE/REPLACE
//! - [`clause`] - Conditions, where-chains, joins and CASE arms
//! - [`queryset`] - [`Manager`] and [`QuerySet`] for per-model queries
//! - [`cursor`] - The lazy [`Cursor`] that hydrates result rows

pub mod builder;
pub mod clause;
pub mod cursor;
pub mod queryset;

pub use builder::{Builder, Operation, AGGREGATE_FUNCTIONS};
pub use clause::{CaseWhen, Condition, Connective, Join, JoinType, WhereTerm};
pub use cursor::Cursor;
pub use queryset::{Manager, QuerySet};
