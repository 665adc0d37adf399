//! # dbal-db-backends
//!
//! Database collaborators for dbal. Provides the SQLite executor, the
//! per-shard [`ConnectionRegistry`](registry::ConnectionRegistry), and
//! statement statistics.
//!
//! Supported backends:
//! - `SQLite` (feature `sqlite`, on by default)

#![allow(clippy::result_large_err)]
#![allow(clippy::format_push_string)]
#![allow(clippy::significant_drop_tightening)]

pub mod registry;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod stats;

pub use registry::ConnectionRegistry;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
pub use stats::{QueryStats, QueryStatsSnapshot};
