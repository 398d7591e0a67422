//! Configuration management for pocketbook
//!
//! This module handles loading, validation, and management of
//! pocketbook configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Data directory and storage key configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the persisted records
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Key under which the transaction list is stored
    #[serde(default = "default_transactions_key")]
    pub transactions_key: String,
    /// Key under which the settings object is stored
    #[serde(default = "default_settings_key")]
    pub settings_key: String,
    /// Route persistence writes through the background write queue
    #[serde(default = "default_true")]
    pub queued_writes: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            transactions_key: default_transactions_key(),
            settings_key: default_settings_key(),
            queued_writes: true,
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_transactions_key() -> String {
    "transactions".to_string()
}

fn default_settings_key() -> String {
    "settings".to_string()
}

fn default_true() -> bool {
    true
}

/// Display limits used by list and chart views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of transactions shown by the recent list
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    /// Number of categories shown in the top spending view
    #[serde(default = "default_top_categories")]
    pub top_categories: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            top_categories: default_top_categories(),
        }
    }
}

fn default_recent_limit() -> usize {
    50
}

fn default_top_categories() -> usize {
    5
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data directory settings
    #[serde(default)]
    pub data: DataConfig,
    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let config = Self::from_yaml(&content)?;
        Ok(config)
    }

    /// Load configuration from a file, falling back to defaults when it is absent
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        // An empty document is a valid, all-default configuration
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.data.transactions_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "data.transactions_key".to_string(),
                reason: "Storage key must not be empty".to_string(),
            });
        }

        if self.data.settings_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "data.settings_key".to_string(),
                reason: "Storage key must not be empty".to_string(),
            });
        }

        if self.data.transactions_key == self.data.settings_key {
            return Err(ConfigError::ValidationError {
                message: "data.transactions_key and data.settings_key must differ".to_string(),
            });
        }

        if self.display.recent_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display.recent_limit".to_string(),
                reason: "Recent limit must be greater than 0".to_string(),
            });
        }

        if self.display.top_categories == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display.top_categories".to_string(),
                reason: "Top categories must be greater than 0".to_string(),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Full path of the file backing a storage key
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.data.path.join(format!("{}.json", key))
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.path, PathBuf::from("./data"));
        assert_eq!(config.data.transactions_key, "transactions");
        assert_eq!(config.data.settings_key, "settings");
        assert!(config.data.queued_writes);
        assert_eq!(config.display.recent_limit, 50);
        assert_eq!(config.display.top_categories, 5);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("display:\n  top_categories: 3\n").unwrap();
        assert_eq!(config.display.top_categories, 3);
        assert_eq!(config.display.recent_limit, 50);
        assert_eq!(config.data.settings_key, "settings");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = Config::from_yaml("   \n").unwrap();
        assert_eq!(config.data.transactions_key, "transactions");
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("data: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml(_)));
        assert!(err.to_string().len() > "Invalid YAML: ".len());
    }

    #[test]
    fn test_validate_rejects_same_keys() {
        let mut config = Config::default();
        config.data.settings_key = "transactions".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = Config::default();
        config.display.recent_limit = 0;
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "display.recent_limit")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_unknown_log_level() {
        let mut config = Config::default();
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generate_default_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.data.transactions_key, "transactions");
        assert_eq!(config.display.top_categories, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        assert!(matches!(
            Config::load(&path),
            Err(ConfigError::FileNotFound { .. })
        ));
        assert!(Config::load_or_default(&path).is_ok());
    }

    #[test]
    fn test_load_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        match Config::load(dir.path()) {
            Err(ConfigError::Unreadable { path, .. }) => assert_eq!(path, dir.path()),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(Config::load_or_default(dir.path()).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "data:\n  path: /tmp/pocketbook\nlogging:\n  level: debug").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.data.path, PathBuf::from("/tmp/pocketbook"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.record_path("settings"),
            PathBuf::from("/tmp/pocketbook/settings.json")
        );
    }
}
