//! Core error types for dbal.
//!
//! [`DbalError`] covers the three failure families of the library: usage
//! errors raised while composing a statement, failures reported by the
//! database collaborator, and configuration problems.

use thiserror::Error;

/// The primary error type for dbal.
///
/// Usage errors (an empty table name, a join without a condition, an INSERT
/// with nothing to insert) are reported here rather than aborting the
/// process, so callers decide how fatal they are.
#[derive(Error, Debug)]
pub enum DbalError {
    // ── Statement composition ────────────────────────────────────────

    /// A builder or query method was called with missing or unusable
    /// arguments.
    #[error("Usage error: {0}")]
    UsageError(String),

    // ── ORM errors ───────────────────────────────────────────────────

    /// Raised when a query expected exactly one result but found multiple.
    #[error("Multiple objects returned when one expected: {0}")]
    MultipleObjectsReturned(String),

    /// A statement failed, or a row could not be mapped.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// An operational database error (connection failure, etc.).
    #[error("Operational error: {0}")]
    OperationalError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The library is improperly configured (unknown engine, a model
    /// without an identifier column, ...).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),
}

impl DbalError {
    /// Returns `true` for errors caused by how the API was called rather
    /// than by the database or the environment.
    pub const fn is_usage_error(&self) -> bool {
        matches!(self, Self::UsageError(_))
    }
}

/// A convenience type alias for `Result<T, DbalError>`.
pub type DbalResult<T> = Result<T, DbalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_display() {
        let err = DbalError::UsageError("missing table name".into());
        assert_eq!(err.to_string(), "Usage error: missing table name");
        assert!(err.is_usage_error());
    }

    #[test]
    fn test_orm_error_display() {
        let err = DbalError::MultipleObjectsReturned("Orders".into());
        assert!(err.to_string().starts_with("Multiple objects returned"));
        assert!(!err.is_usage_error());
    }
}
