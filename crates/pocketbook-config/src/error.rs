//! Error types for pocketbook-config

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Conflicting settings: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// Dotted key of the offending field, when a single field is at fault
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidValue { field, .. } => Some(field),
            _ => None,
        }
    }

    /// One-line hint printed under the error by the CLI
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ConfigError::FileNotFound { .. } => {
                Some("pass --config with an existing file, or run `pocketbook init-config`")
            }
            ConfigError::Unreadable { source, .. } if source.kind() == io::ErrorKind::PermissionDenied => {
                Some("check the permissions of the configuration file")
            }
            ConfigError::InvalidYaml(_) | ConfigError::InvalidValue { .. } => {
                Some("compare the file with the output of `pocketbook init-config`")
            }
            ConfigError::ValidationError { .. } => {
                Some("data.transactions_key and data.settings_key name separate records")
            }
            ConfigError::Unreadable { .. } => None,
        }
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_yaml_keeps_parser_message() {
        let source = serde_yaml::from_str::<Vec<u32>>("[1, two").unwrap_err();
        let expected = source.to_string();
        let error = ConfigError::from(source);

        assert!(error.to_string().starts_with("Invalid YAML: "));
        assert!(error.to_string().contains(&expected));
        assert!(error.hint().is_some());
    }

    #[test]
    fn test_unreadable_keeps_io_source() {
        let error = ConfigError::Unreadable {
            path: PathBuf::from("/etc/pocketbook.yaml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };

        assert!(error.to_string().contains("/etc/pocketbook.yaml"));
        assert!(error.to_string().contains("permission denied"));
        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(source.to_string(), "permission denied");
        assert_eq!(error.hint(), Some("check the permissions of the configuration file"));
    }

    #[test]
    fn test_field_only_for_invalid_value() {
        let error = ConfigError::InvalidValue {
            field: "display.recent_limit".to_string(),
            reason: "Recent limit must be greater than 0".to_string(),
        };
        assert_eq!(error.field(), Some("display.recent_limit"));

        let missing = ConfigError::FileNotFound {
            path: PathBuf::from("config.yaml"),
        };
        assert_eq!(missing.field(), None);
        assert_eq!(missing.to_string(), "Configuration file not found: config.yaml");
    }
}
