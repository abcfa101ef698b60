//! Workspace configuration.
//!
//! # Responsibility
//! - Read the optional `shelf.toml` at a workspace root.
//! - Supply defaults for every setting the file omits.
//!
//! # Invariants
//! - A missing file is equivalent to an empty one.
//! - Unknown keys are rejected.

use crate::logging::default_log_level;
use crate::partition::PartitionOptions;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "shelf.toml";
pub const DEFAULT_DATE_LIMIT: usize = 31;
pub const DEFAULT_SECTION_LIMIT: usize = 100;

/// Errors from reading or parsing `shelf.toml`.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read {CONFIG_FILE_NAME}: {err}"),
            Self::Parse(err) => write!(f, "invalid {CONFIG_FILE_NAME}: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Settings for one workspace. Relative paths resolve against the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
    #[serde(default = "default_database_file")]
    pub database_file: PathBuf,
    #[serde(default = "default_date_limit")]
    pub date_limit: usize,
    #[serde(default = "default_section_limit")]
    pub section_limit: usize,
    #[serde(default)]
    pub log_level: Option<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            database_file: default_database_file(),
            date_limit: DEFAULT_DATE_LIMIT,
            section_limit: DEFAULT_SECTION_LIMIT,
            log_level: None,
        }
    }
}

impl WorkspaceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(Into::into)
    }

    /// Loads `shelf.toml` from `root`, falling back to defaults when absent.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(root.join(CONFIG_FILE_NAME)) {
            Ok(content) => Self::from_toml_str(&content),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Configured level, or the build-mode default.
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or_else(|| default_log_level())
    }

    pub fn partition_options(&self) -> PartitionOptions {
        PartitionOptions {
            date_limit: Some(self.date_limit),
            section_limit: Some(self.section_limit),
        }
    }
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("index")
}

fn default_database_file() -> PathBuf {
    PathBuf::from("shelf.db")
}

fn default_date_limit() -> usize {
    DEFAULT_DATE_LIMIT
}

fn default_section_limit() -> usize {
    DEFAULT_SECTION_LIMIT
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, WorkspaceConfig, CONFIG_FILE_NAME};
    use crate::logging::default_log_level;
    use std::path::PathBuf;

    #[test]
    fn empty_file_yields_defaults() {
        let config = WorkspaceConfig::from_toml_str("").unwrap();
        assert_eq!(config, WorkspaceConfig::default());
        assert_eq!(config.index_dir, PathBuf::from("index"));
        assert_eq!(config.partition_options().date_limit, Some(31));
        assert_eq!(config.partition_options().section_limit, Some(100));
        assert_eq!(config.log_level(), default_log_level());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = WorkspaceConfig::from_toml_str(
            "index_dir = \"graph\"\nsection_limit = 5\nlog_level = \"warn\"\n",
        )
        .unwrap();
        assert_eq!(config.index_dir, PathBuf::from("graph"));
        assert_eq!(config.section_limit, 5);
        assert_eq!(config.date_limit, 31);
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = WorkspaceConfig::from_toml_str("date_limt = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            WorkspaceConfig::load(dir.path()).unwrap(),
            WorkspaceConfig::default()
        );

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "date_limit = 7").unwrap();
        assert_eq!(WorkspaceConfig::load(dir.path()).unwrap().date_limit, 7);
    }
}
