// ⚙️ Configuration - weighing-ledger.toml
//
// Loaded from a TOML file; every section and field is optional.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::display_offset;
use crate::report::ReportOptions;
use crate::store::DEFAULT_STORAGE_KEY;

/// Default config file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "weighing-ledger.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("utc_offset_hours must be between -23 and 23, got {0}")]
    OffsetOutOfRange(i32),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Json,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which store holds the record list
    #[serde(default)]
    pub backend: StorageBackend,

    /// Data directory (defaults to the platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// File stem the record list is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: None,
            storage_key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Offset used to show dates; America/Bogota is -5 all year
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_organization")]
    pub organization: String,

    /// Where exports are written (defaults to the working directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_utc_offset() -> i32 {
    -5
}

fn default_organization() -> String {
    "ANNCOR".to_string()
}

fn default_log_filter() -> String {
    "weighing_ledger=info".to_string()
}

impl Config {
    /// Read `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let hours = self.display.utc_offset_hours;
        if !(-23..=23).contains(&hours) {
            return Err(ConfigError::OffsetOutOfRange(hours));
        }
        Ok(())
    }

    /// Configured data dir, else the platform data dir, else `./data`
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("co", "anncor", "weighing-ledger")
                    .map(|dirs| dirs.data_dir().to_path_buf())
            })
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    pub fn offset(&self) -> FixedOffset {
        display_offset(self.display.utc_offset_hours)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.report
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            organization: self.report.organization.clone(),
            offset: self.offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.storage.backend, StorageBackend::Json);
        assert_eq!(config.storage.storage_key, "anncor_weighings_v1");
        assert_eq!(config.display.utc_offset_hours, -5);
        assert_eq!(config.report.organization, "ANNCOR");
        assert_eq!(config.logging.filter, "weighing_ledger=info");
        assert_eq!(config.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
[storage]
backend = "sqlite"
data_dir = "/var/lib/granja"

[report]
organization = "Granja El Roble"
"#,
        )
        .unwrap();

        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.data_dir(), PathBuf::from("/var/lib/granja"));
        assert_eq!(config.storage.storage_key, "anncor_weighings_v1");
        assert_eq!(config.report.organization, "Granja El Roble");
        assert_eq!(config.display.utc_offset_hours, -5);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.report.organization, "ANNCOR");
    }

    #[test]
    fn test_rejects_bad_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[display]\nutc_offset_hours = 40\n").unwrap();

        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::OffsetOutOfRange(40))
        ));
    }

    #[test]
    fn test_rejects_unknown_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[storage]\nbackend = \"postgres\"\n").unwrap();

        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }
}
