//! Runtime configuration for embedding hosts and the CLI.
//!
//! # Invariants
//! - Every field has a default; an empty environment yields a usable config.
//! - `validate()` applies the same level/directory rules as `init_logging`.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "ACADEMIEVENT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "ACADEMIEVENT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ACADEMIEVENT_LOG_DIR";
pub const ENV_NOTIFICATIONS: &str = "ACADEMIEVENT_NOTIFICATIONS";

const DEFAULT_DB_FILE_NAME: &str = "academievent.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Core runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Schedule database file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute log directory; `None` leaves logging uninitialized.
    pub log_dir: Option<PathBuf>,
    pub notifications_enabled: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            notifications_enabled: true,
        }
    }
}

impl CoreConfig {
    /// Reads `ACADEMIEVENT_*` variables over defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(db_path) = value(ENV_DB_PATH) {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(log_dir) = value(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(log_dir));
        }
        if let Some(flag) = value(ENV_NOTIFICATIONS) {
            config.notifications_enabled = parse_flag(ENV_NOTIFICATIONS, &flag)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks level and log directory against logging rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level).map_err(|err| ConfigError::InvalidValue {
            key: ENV_LOG_LEVEL,
            value: self.log_level.clone(),
            reason: err.to_string(),
        })?;

        if let Some(log_dir) = &self.log_dir {
            let display = log_dir.to_string_lossy();
            normalize_log_dir(&display).map_err(|err| ConfigError::InvalidValue {
                key: ENV_LOG_DIR,
                value: display.to_string(),
                reason: err.to_string(),
            })?;
        }

        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: ENV_DB_PATH,
                value: String::new(),
                reason: "database path cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "expected true|false".to_string(),
        }),
    }
}
