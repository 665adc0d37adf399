//! # dbal-db
//!
//! The statement builder and the model layer of dbal. Provides the fluent
//! SQL [`Builder`](query::Builder), the [`Model`](model::Model) trait with
//! its static [`ModelMeta`](model::ModelMeta), and lazy
//! [`QuerySet`](query::QuerySet)s handed out by a per-model
//! [`Manager`](query::Manager).
//!
//! ## Architecture
//!
//! A query set only accumulates criteria. SQL is rendered when a terminal
//! method runs (`count`, `get`, `at`, `first`, `all`, or the first step of
//! a [`Cursor`](query::Cursor)); the text then crosses the
//! [`DbExecutor`](executor::DbExecutor) seam, and the returned rows are
//! hydrated by the [`DataMapper`](model::DataMapper).
//!
//! ## Module Overview
//!
//! - [`value`] - The [`Value`](value::Value) enum and SQL literal rendering
//! - [`row`] - Result rows and [`FromValue`](row::FromValue) conversions
//! - [`fields`] - Column metadata ([`Column`](fields::Column))
//! - [`query`] - The builder, clauses, query sets and cursors
//! - [`model`] - Models, records, foreign keys and the data mapper
//! - [`executor`] - The database seam and model write helpers

// - result_large_err: DbalError is the crate-wide error type and should be used consistently
// - format_push_string: format! with push_str is clearer than write! for SQL generation
// - return_self_not_must_use: builder pattern methods are self-documenting
#![allow(clippy::result_large_err)]
#![allow(clippy::format_push_string)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]

pub mod executor;
pub mod fields;
pub mod model;
pub mod query;
pub mod row;
pub mod value;

#[cfg(test)]
mod testing;

// Re-export the most commonly used types at the crate root.
pub use executor::{
    create_model, delete_model, BufferedRowSet, DbExecutor, QueryOutcome, ResultMode,
    RoutedExecutor, RowSet, ShardResolver,
};
pub use fields::{Column, ColumnKind};
pub use model::{DataMapper, ForeignKey, Model, ModelMeta, Record};
pub use query::{
    Builder, CaseWhen, Condition, Connective, Cursor, Join, JoinType, Manager, Operation, QuerySet,
    WhereTerm, AGGREGATE_FUNCTIONS,
};
pub use row::{FromValue, Row};
pub use value::Value;
