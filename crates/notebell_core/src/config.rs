//! Runtime configuration for core hosts (CLI, FFI shell).
//!
//! # Responsibility
//! - Resolve database path, log directory, log level and permission policy.
//!
//! # Invariants
//! - Load order is: built-in defaults, JSON file, `NOTEBELL_*` environment.
//! - A missing default config file is not an error; a missing explicit one is.
//! - Blank environment values are ignored.

use crate::logging::default_log_level;
use crate::notify::local::PermissionPolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "notebell";
const CONFIG_FILE_NAME: &str = "config.json";
const DB_FILE_NAME: &str = "notebell.sqlite3";

pub const ENV_DB_PATH: &str = "NOTEBELL_DB_PATH";
pub const ENV_LOG_DIR: &str = "NOTEBELL_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "NOTEBELL_LOG_LEVEL";
pub const ENV_PERMISSION_POLICY: &str = "NOTEBELL_PERMISSION_POLICY";

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidValue {
        key: &'static str,
        value: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub permission_policy: PermissionPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    pub notifications: NotificationConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        let base = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR_NAME);
        Self {
            db_path: base.join(DB_FILE_NAME),
            log_dir: base.join("logs"),
            log_level: default_log_level().to_string(),
            notifications: NotificationConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Loads configuration from `explicit` (or the default location) and
    /// applies process environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `NOTEBELL_*` overrides read through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = read(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = read(ENV_LOG_DIR) {
            self.log_dir = PathBuf::from(value);
        }
        if let Some(value) = read(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = read(ENV_PERMISSION_POLICY) {
            self.notifications.permission_policy = match value.to_ascii_lowercase().as_str() {
                "auto_grant" => PermissionPolicy::AutoGrant,
                "deny" => PermissionPolicy::Deny,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_PERMISSION_POLICY,
                        value,
                    })
                }
            };
        }
        Ok(())
    }
}

/// Returns `<config_dir>/notebell/config.json` when a config dir exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}
