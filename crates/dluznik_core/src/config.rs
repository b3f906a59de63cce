//! Runtime configuration for the store and logging.
//!
//! Values come from the environment by default; embedders can deserialize
//! the same types from their own config files.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "DLUZNIK_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "DLUZNIK_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "DLUZNIK_LOG_DIR";
pub const DEFAULT_DB_PATH: &str = "dluznik.db";

/// Location of the store file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Reads `DLUZNIK_DB_PATH`, falling back to `dluznik.db` in the working
    /// directory.
    pub fn from_env() -> Self {
        Self::new(non_empty_var(DB_PATH_ENV).unwrap_or_else(|| DEFAULT_DB_PATH.to_string()))
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH)
    }
}

/// Logging backend settings.
///
/// `log_dir = None` logs to stderr; otherwise rotating files are written to
/// that absolute directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    /// Reads `DLUZNIK_LOG_LEVEL` and `DLUZNIK_LOG_DIR`.
    pub fn from_env() -> Self {
        Self {
            level: non_empty_var(LOG_LEVEL_ENV)
                .unwrap_or_else(|| crate::logging::default_log_level().to_string()),
            log_dir: non_empty_var(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            store: StoreConfig::from_env(),
            logging: LoggingConfig::from_env(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
