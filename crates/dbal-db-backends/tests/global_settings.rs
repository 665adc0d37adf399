//! Registry construction from the process-wide settings.
//!
//! Kept in its own test binary: it is the only test that configures the
//! global `SETTINGS`.

#![cfg(feature = "sqlite")]

use dbal_core::{DatabaseSettings, DbalError, Settings, SETTINGS};
use dbal_db_backends::ConnectionRegistry;

#[test]
fn test_from_global_before_and_after_configure() {
    let err = ConnectionRegistry::from_global().unwrap_err();
    assert!(matches!(err, DbalError::ImproperlyConfigured(_)));

    SETTINGS.configure(
        Settings::default().with_database("reporting", DatabaseSettings::sqlite(":memory:")),
    );

    let registry = ConnectionRegistry::from_global().unwrap();
    assert!(registry.settings().database("reporting").is_some());
    let conn = registry.connect("reporting").unwrap();
    assert_eq!(conn.shard(), "reporting");
    assert_eq!(registry.connected_shards().unwrap(), vec!["reporting".to_string()]);
}
