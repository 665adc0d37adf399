//! # dbal-core
//!
//! Core types, settings, and error types shared by every dbal crate.
//! This crate has no dependency on the query layer and provides the
//! foundation for the others.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Database shards, log level, and global configuration
//! - [`settings_loader`] - Loading settings from TOML/JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{DbalError, DbalResult};
pub use settings::{DatabaseSettings, Settings, SETTINGS};
