//! TOML configuration.
//!
//! Every section is optional; an empty file yields the defaults:
//!
//! ```toml
//! [storage]
//! path = "census.db"            # omit for an in-memory store
//!
//! [reference]
//! path = "health_analysis.json" # or: url = "https://example.org/health_analysis.json"
//! timeout_seconds = 30          # omit for no client timeout
//!
//! [report]
//! recent_limit = 10
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::storage::{SqliteStorage, StorageResult};

/// Default location of the reference dataset document.
pub const DEFAULT_REFERENCE_PATH: &str = "health_analysis.json";

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration validation failed: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CensusConfig {
    pub storage: StorageConfig,
    pub reference: ReferenceConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite file; `None` keeps everything in memory
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Remote document. Takes precedence over `path`.
    pub url: Option<String>,
    pub path: PathBuf,
    pub timeout_seconds: Option<u64>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            url: None,
            path: PathBuf::from(DEFAULT_REFERENCE_PATH),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows in the recent-patients table
    pub recent_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { recent_limit: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CensusConfig {
    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: CensusConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.report.recent_limit == 0 {
            return Err(ConfigError::Invalid(
                "report.recent_limit must be greater than 0".into(),
            ));
        }
        if let Some(url) = &self.reference.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "reference.url must be an http(s) URL, got {url}"
                )));
            }
        }
        if self.reference.timeout_seconds == Some(0) {
            return Err(ConfigError::Invalid(
                "reference.timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.logging.level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of trace, debug, info, warn, error, got {}",
                self.logging.level
            )));
        }
        Ok(())
    }
}

impl StorageConfig {
    /// Open the configured store.
    pub fn open(&self) -> StorageResult<SqliteStorage> {
        match &self.path {
            Some(path) => SqliteStorage::open(path),
            None => SqliteStorage::open_in_memory(),
        }
    }
}
