//! Per-shard connection registry.
//!
//! A [`ConnectionRegistry`] is owned by the caller and hands out one shared
//! executor per shard key. Connections are opened lazily from the
//! configured [`DatabaseSettings`](dbal_core::DatabaseSettings) on first
//! request and cached for the life of the registry.
//!
//! The registry is also a [`ShardResolver`]: executors obtained through
//! [`routed`](ConnectionRegistry::routed) load related models declared on
//! other shards from those shards' connections.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use dbal_core::settings::{LazySettings, Settings, SQLITE_ENGINE};
use dbal_core::{DbalError, DbalResult, SETTINGS};
use dbal_db::executor::{DbExecutor, RoutedExecutor, ShardResolver};
use dbal_db::model::Model;

/// Lazily opened, cached connections keyed by shard.
pub struct ConnectionRegistry {
    settings: Settings,
    connections: Mutex<HashMap<String, Arc<dyn DbExecutor>>>,
}

impl ConnectionRegistry {
    /// A registry serving the shards configured in `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// A registry over the global [`SETTINGS`].
    ///
    /// # Errors
    ///
    /// Returns [`DbalError::ImproperlyConfigured`] if the global settings
    /// have not been configured.
    pub fn from_global() -> DbalResult<Self> {
        Self::from_lazy(&SETTINGS)
    }

    /// A registry over a copy of `lazy`, which must be configured.
    pub fn from_lazy(lazy: &LazySettings) -> DbalResult<Self> {
        if !lazy.is_configured() {
            return Err(DbalError::ImproperlyConfigured(
                "Global settings have not been configured".to_string(),
            ));
        }
        Ok(Self::new(lazy.get().clone()))
    }

    /// The settings this registry connects from.
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    fn lock(&self) -> DbalResult<MutexGuard<'_, HashMap<String, Arc<dyn DbExecutor>>>> {
        self.connections
            .lock()
            .map_err(|_| DbalError::OperationalError("Connection registry lock poisoned".to_string()))
    }

    /// Returns the connection for `shard`, opening it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DbalError::ImproperlyConfigured`] for an unknown shard or
    /// engine, and [`DbalError::OperationalError`] if the connection cannot
    /// be opened.
    pub fn connect(&self, shard: &str) -> DbalResult<Arc<dyn DbExecutor>> {
        let mut connections = self.lock()?;
        if let Some(conn) = connections.get(shard) {
            return Ok(Arc::clone(conn));
        }

        let config = self.settings.database(shard).ok_or_else(|| {
            DbalError::ImproperlyConfigured(format!("No database configured for shard '{shard}'"))
        })?;
        let conn: Arc<dyn DbExecutor> = match config.engine.as_str() {
            #[cfg(feature = "sqlite")]
            SQLITE_ENGINE => Arc::new(crate::sqlite::SqliteBackend::open(shard, &config.name)?),
            other => {
                return Err(DbalError::ImproperlyConfigured(format!(
                    "Unsupported database engine '{other}' for shard '{shard}'"
                )));
            }
        };

        tracing::info!(shard, engine = %config.engine, "registered connection");
        connections.insert(shard.to_string(), Arc::clone(&conn));
        Ok(conn)
    }

    /// Returns the connection serving model `M`.
    pub fn connect_for<M: Model>(&self) -> DbalResult<Arc<dyn DbExecutor>> {
        self.connect(M::shard())
    }

    /// Returns the connection for `shard`, wrapped so that relations on
    /// other shards are resolved through this registry.
    pub fn routed(&self, shard: &str) -> DbalResult<RoutedExecutor<'_>> {
        Ok(RoutedExecutor::new(self.connect(shard)?, self))
    }

    /// Returns the routed connection serving model `M`.
    pub fn routed_for<M: Model>(&self) -> DbalResult<RoutedExecutor<'_>> {
        self.routed(M::shard())
    }

    /// Installs an already opened executor under `shard`, replacing any
    /// cached one.
    pub fn register(&self, shard: impl Into<String>, conn: Arc<dyn DbExecutor>) -> DbalResult<()> {
        self.lock()?.insert(shard.into(), conn);
        Ok(())
    }

    /// Shards with an open connection.
    pub fn connected_shards(&self) -> DbalResult<Vec<String>> {
        let mut shards: Vec<String> = self.lock()?.keys().cloned().collect();
        shards.sort();
        Ok(shards)
    }
}

impl ShardResolver for ConnectionRegistry {
    fn resolve(&self, shard: &str) -> DbalResult<Arc<dyn DbExecutor>> {
        self.connect(shard)
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("shards", &self.settings.databases.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
