//! Runtime configuration for catalog processes.
//!
//! # Responsibility
//! - Parse the JSON configuration file shared by catalog binaries.
//! - Apply defaults and reject values no process could start with.
//!
//! # Invariants
//! - A returned `CatalogConfig` always has a non-empty database path.
//! - `log_level` falls back to the build-mode default when omitted.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "malformed config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings for one catalog process.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// SQLite database file holding catalog records.
    pub database_path: PathBuf,
    #[serde(default = "default_level")]
    pub log_level: String,
    /// File logging stays off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl CatalogConfig {
    /// Reads and validates the JSON config at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path cannot be empty".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{CatalogConfig, ConfigError};
    use crate::logging::default_log_level;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn minimal_config_applies_defaults() {
        let config = CatalogConfig::from_json_str(r#"{"database_path": "/var/lib/catalog.db"}"#)
            .expect("minimal config");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/catalog.db"));
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn empty_database_path_is_invalid() {
        let err = CatalogConfig::from_json_str(r#"{"database_path": ""}"#)
            .expect_err("empty path rejected");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_fields_and_bad_json_fail_to_parse() {
        let err = CatalogConfig::from_json_str(r#"{"database_path": "a.db", "port": 1}"#)
            .expect_err("unknown field rejected");
        assert!(matches!(err, ConfigError::Parse(_)));

        let err = CatalogConfig::from_json_str("{").expect_err("truncated json rejected");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"database_path": "catalog.db", "log_level": "warn", "log_dir": "/tmp/catalog-logs"}}"#
        )
        .expect("write config");

        let config = CatalogConfig::load(file.path()).expect("load config");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/catalog-logs")));

        let err = CatalogConfig::load("/nonexistent/catalog.json").expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
