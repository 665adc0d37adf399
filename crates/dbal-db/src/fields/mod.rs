//! Field metadata for models.
//!
//! [`Column`] describes one declared field; [`ModelFields`] adds lookups
//! over a model's static column list.

pub mod column;

pub use column::{validate_fields, Column, ColumnKind, ModelFields};
