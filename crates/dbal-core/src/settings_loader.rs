//! Settings loading from configuration files.
//!
//! Settings are layered:
//!
//! 1. Start with default settings (one in-memory SQLite `default` shard).
//! 2. Load from a TOML or JSON file, deep-merged over the defaults.
//! 3. Apply environment variable overrides (highest priority).
//!
//! | Env Var | Setting |
//! |---|---|
//! | `DBAL_DEBUG` | `debug` |
//! | `DBAL_LOG_LEVEL` | `log_level` |
//! | `DBAL_DEFAULT_DATABASE` | `databases.default.name` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use dbal_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file("config/dbal.toml").unwrap();
//! let settings = settings_loader::from_json_file_with_env("config/dbal.json").unwrap();
//! ```

use std::path::Path;

use crate::error::{DbalError, DbalResult};
use crate::settings::{DatabaseSettings, Settings, DEFAULT_SHARD};

/// Loads settings from a TOML string.
///
/// Keys absent from the TOML keep their default values.
pub fn from_toml_str(toml_str: &str) -> DbalResult<Settings> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| DbalError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_onto_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> DbalResult<Settings> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> DbalResult<Settings> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> DbalResult<Settings> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| DbalError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_onto_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> DbalResult<Settings> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> DbalResult<Settings> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `DBAL_*` environment variable overrides to a settings struct.
///
/// `DBAL_DEBUG` accepts "true", "1" or "yes"; anything else turns debug off.
/// `DBAL_DEFAULT_DATABASE` replaces the name of the `default` shard, creating
/// a SQLite shard if none is configured.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("DBAL_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("DBAL_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("DBAL_DEFAULT_DATABASE") {
        settings
            .databases
            .entry(DEFAULT_SHARD.to_string())
            .or_insert_with(DatabaseSettings::default)
            .name = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> DbalResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        DbalError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

/// Deep-merges `overrides` onto the serialized defaults and deserializes the
/// result. Shard entries in `overrides` are themselves merged onto
/// [`DatabaseSettings::default`], so a shard may omit fields.
fn merge_onto_defaults(overrides: serde_json::Value, format: &str) -> DbalResult<Settings> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        DbalError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;
    let default_db = serde_json::to_value(DatabaseSettings::default()).map_err(|e| {
        DbalError::ConfigurationError(format!("Failed to serialize default database: {e}"))
    })?;

    let overrides = match overrides {
        serde_json::Value::Object(mut map) => {
            if let Some(serde_json::Value::Object(shards)) = map.remove("databases") {
                let shards = shards
                    .into_iter()
                    .map(|(shard, db)| (shard, merge_json(default_db.clone(), db)))
                    .collect();
                map.insert("databases".into(), serde_json::Value::Object(shards));
            }
            serde_json::Value::Object(map)
        }
        other => other,
    };

    let merged = merge_json(default_json, overrides);
    serde_json::from_value(merged).map_err(|e| {
        DbalError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
