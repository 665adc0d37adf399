//! # dbal
//!
//! A fluent SQL statement builder with a lazy, cursor-driven row-to-model
//! mapper.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `dbal` to get everything, or depend on individual crates
//! for finer-grained control.
//!
//! ```
//! use dbal::prelude::*;
//!
//! let sql = Builder::select("Orders", Some("o"))?
//!     .columns("o.OrderID, o.ShipCity")
//!     .where_(("o.ShipCountry", "=", "France"))
//!     .order_by("o.OrderID")
//!     .offset_limits(10, 5)
//!     .to_sql()?;
//! assert_eq!(
//!     sql,
//!     "SELECT o.OrderID, o.ShipCity FROM Orders AS o WHERE o.ShipCountry = 'France' \
//!      ORDER BY o.OrderID LIMIT 10, 5"
//! );
//! # Ok::<(), dbal::core::DbalError>(())
//! ```

/// Core types, settings, logging, and error types.
pub use dbal_core as core;

/// Statement builder, models, query sets and cursors.
#[cfg(feature = "db")]
pub use dbal_db as db;

/// Database collaborators: the SQLite executor and the connection registry.
pub use dbal_db_backends as db_backends;

/// Re-exports of commonly used third-party crates.
pub mod deps {
    pub use chrono;
    pub use serde;
    pub use serde_json;
    pub use tracing;
    pub use tracing_subscriber;
}

/// The most commonly used items, for glob import.
pub mod prelude {
    pub use dbal_core::{DatabaseSettings, DbalError, DbalResult, Settings};
    #[cfg(feature = "db")]
    pub use dbal_db::{
        Builder, Column, ColumnKind, Condition, DbExecutor, ForeignKey, JoinType, Manager, Model,
        ModelMeta, QuerySet, Record, ResultMode, RoutedExecutor, ShardResolver, Value,
    };
    pub use dbal_db_backends::ConnectionRegistry;
    #[cfg(feature = "sqlite")]
    pub use dbal_db_backends::SqliteBackend;
}
