//! Settings for dbal.
//!
//! [`Settings`] holds the database shards and logging options;
//! [`LazySettings`] is a globally-accessible, lazily-initialized instance
//! for applications that prefer one process-wide configuration.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Name of the shard used when a model does not pick one.
pub const DEFAULT_SHARD: &str = "default";

/// Engine name of the bundled SQLite collaborator.
pub const SQLITE_ENGINE: &str = "sqlite";

/// Connection configuration for a single shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// The database engine (e.g. `sqlite`).
    pub engine: String,
    /// The database name (or file path / `:memory:` for SQLite).
    pub name: String,
    /// The database user.
    pub user: String,
    /// The database password.
    pub password: String,
    /// The database host.
    pub host: String,
    /// The database port.
    pub port: u16,
    /// Additional engine-specific options.
    pub options: HashMap<String, String>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            engine: SQLITE_ENGINE.to_string(),
            name: ":memory:".to_string(),
            user: String::new(),
            password: String::new(),
            host: String::new(),
            port: 0,
            options: HashMap::new(),
        }
    }
}

impl DatabaseSettings {
    /// SQLite settings for the given file path (or `:memory:`).
    pub fn sqlite(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The complete set of dbal settings.
///
/// # Examples
///
/// ```
/// use dbal_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert!(settings.database("default").is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,

    // ── Database ─────────────────────────────────────────────────────

    /// Database configurations, keyed by shard (e.g. "default").
    pub databases: HashMap<String, DatabaseSettings>,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log level / filter directive (e.g. "info", "dbal_db=debug").
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        let mut databases = HashMap::new();
        databases.insert(DEFAULT_SHARD.to_string(), DatabaseSettings::default());

        Self {
            debug: true,
            databases,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Returns the configuration of the given shard.
    pub fn database(&self, shard: &str) -> Option<&DatabaseSettings> {
        self.databases.get(shard)
    }

    /// Adds or replaces a shard configuration.
    #[must_use]
    pub fn with_database(mut self, shard: impl Into<String>, db: DatabaseSettings) -> Self {
        self.databases.insert(shard.into(), db);
        self
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup, then use
/// [`get`](LazySettings::get) to access the settings.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
