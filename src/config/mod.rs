//! # Config Module
//!
//! Read-only settings lookup by dotted key (`organization.default_strategy`).
//!
//! [`JsonConfig`] layers an optional JSON file over built-in defaults. A
//! missing file is not an error; a corrupt one is.
//!
//! ## Example
//! ```rust,ignore
//! use file_organizer::config::{keys, ConfigProvider, JsonConfig};
//!
//! let config = JsonConfig::load_default()?;
//! let strategy = config.get_str(keys::DEFAULT_STRATEGY, "smart");
//! ```

use crate::error::ConfigError;
use serde_json::{json, Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Keys understood by the organizer
pub mod keys {
    pub const DEFAULT_STRATEGY: &str = "organization.default_strategy";
    pub const REMOVE_EMPTY_SOURCE: &str = "organization.remove_empty_source";
    pub const RECENT_DAYS_THRESHOLD: &str = "organization.recent_days_threshold";
    pub const EXTRACT_GPS_LOCATION: &str = "metadata.extract_gps_location";
    pub const EXTRACT_PERSONAL_INFO: &str = "metadata.extract_personal_info";
    pub const SANITIZE_ERROR_MESSAGES: &str = "privacy.sanitize_error_messages";
}

/// Directory name under the platform config dir
const APP_DIR: &str = "file-organizer";
const CONFIG_FILE: &str = "config.json";

/// Read-only settings source
pub trait ConfigProvider: Send + Sync {
    /// Raw value for a dotted key
    fn get(&self, key: &str) -> Option<&Value>;

    fn get_str<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(Value::as_str).unwrap_or(default)
    }

    fn get_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(default)
    }

    fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.get(key).and_then(Value::as_u64).unwrap_or(default)
    }
}

/// Defaults merged with an optional JSON document
#[derive(Debug, Clone)]
pub struct JsonConfig {
    root: Value,
    source: Option<PathBuf>,
}

impl JsonConfig {
    /// Built-in defaults only
    pub fn defaults() -> Self {
        Self {
            root: default_document(),
            source: None,
        }
    }

    /// Defaults overlaid with `overrides`
    pub fn from_value(overrides: Value) -> Self {
        let mut root = default_document();
        merge(&mut root, overrides);
        Self { root, source: None }
    }

    /// Load from `path`, falling back to defaults when the file is absent
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("no configuration file, using defaults");
                return Ok(Self::defaults());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let overrides: Value = serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !overrides.is_object() {
            return Err(ConfigError::Parse {
                path: path.to_path_buf(),
                reason: "top level must be a JSON object".to_string(),
            });
        }

        let mut config = Self::from_value(overrides);
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load from the platform location, or defaults if there is none
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::defaults()),
        }
    }

    /// `<config dir>/file-organizer/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// File the settings were read from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl ConfigProvider for JsonConfig {
    fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.root, |node, segment| node.as_object()?.get(segment))
    }
}

fn default_document() -> Value {
    json!({
        "organization": {
            "default_strategy": "smart",
            "remove_empty_source": false,
            "recent_days_threshold": 30
        },
        "metadata": {
            "extract_gps_location": true,
            "extract_personal_info": true
        },
        "privacy": {
            "sanitize_error_messages": true
        }
    })
}

/// Objects merge key by key; anything else replaces
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                merge(base.entry(key).or_insert(Value::Object(Map::new())), value);
            }
        }
        (slot, value) => *slot = value,
    }
}
