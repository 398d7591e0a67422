//! Error types for pocketbook-core
//!
//! Errors carry a stable code and a severity so hosts can decide how to
//! surface them. None of them are fatal: validation errors reject a single
//! operation, persistence errors only degrade durability.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Import document rejected
    ValidationError,
    /// Storage read or write failed
    PersistenceError,
    /// State could not be encoded
    SerializationError,
    /// IO error
    IoError,
    /// File not found
    FileNotFound,
    /// Background write queue is gone
    QueueClosed,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::PersistenceError => write!(f, "PERSISTENCE_ERROR"),
            ErrorCode::SerializationError => write!(f, "SERIALIZATION_ERROR"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            ErrorCode::QueueClosed => write!(f, "QUEUE_CLOSED"),
        }
    }
}

/// Detailed error information for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Operation went through with reduced guarantees
    Warning,
    /// Operation failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for pocketbook-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Persistence error for '{key}': {message}")]
    PersistenceError { key: String, message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Write queue is closed")]
    QueueClosed,
}

impl CoreError {
    /// Shorthand for an import validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            message: message.into(),
        }
    }

    /// Shorthand for a storage failure on a key
    pub fn persistence(key: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::PersistenceError {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::PersistenceError { .. } => ErrorCode::PersistenceError,
            CoreError::SerializationError { .. } => ErrorCode::SerializationError,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::FileNotFound { .. } => ErrorCode::FileNotFound,
            CoreError::QueueClosed => ErrorCode::QueueClosed,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::PersistenceError { .. } => ErrorSeverity::Warning,
            CoreError::SerializationError { .. } => ErrorSeverity::Error,
            CoreError::IoError { .. } => ErrorSeverity::Error,
            CoreError::FileNotFound { .. } => ErrorSeverity::Error,
            CoreError::QueueClosed => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::ValidationError { message } => {
                details = details
                    .with_detail(serde_json::json!({ "validation_message": message }));
                details = details.with_suggestion(
                    "The document must be a JSON object with a `transactions` array.".to_string(),
                );
                details = details.with_suggestion(
                    "Nothing was imported; the current data is unchanged.".to_string(),
                );
            }
            CoreError::PersistenceError { key, .. } => {
                details = details.with_detail(serde_json::json!({ "key": key }));
                details = details.with_suggestion(
                    "The change is kept in memory but may be lost on exit.".to_string(),
                );
                details = details.with_suggestion(
                    "Check that the data directory exists and is writable.".to_string(),
                );
            }
            CoreError::FileNotFound { .. } => {
                details = details
                    .with_suggestion("Check if the file path is correct.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(error: io::Error) -> Self {
        CoreError::IoError {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Warning => log::warn!(
                target: "pocketbook::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            _ => log::error!(
                target: "pocketbook::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(),
                error.to_details(),
                context.operation,
                context.data
            ),
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::ValidationError.to_string(), "VALIDATION_ERROR");
        assert_eq!(ErrorCode::PersistenceError.to_string(), "PERSISTENCE_ERROR");
        assert_eq!(ErrorCode::QueueClosed.to_string(), "QUEUE_CLOSED");
    }

    #[test]
    fn test_error_severity_display() {
        assert_eq!(ErrorSeverity::Warning.to_string(), "warning");
        assert_eq!(ErrorSeverity::Error.to_string(), "error");
    }

    #[test]
    fn test_persistence_error_is_a_warning() {
        let error = CoreError::persistence("transactions", "disk full");
        assert_eq!(error.code(), ErrorCode::PersistenceError);
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(error.to_string().contains("transactions"));
    }

    #[test]
    fn test_validation_error_details() {
        let error = CoreError::validation("missing `transactions`");
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::ValidationError);
        assert!(details.details.is_some());
        assert_eq!(details.suggestions.len(), 2);
        assert!(details.to_string().contains("missing `transactions`"));
    }

    #[test]
    fn test_from_io_error() {
        let io = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let error: CoreError = io.into();
        assert_eq!(error.code(), ErrorCode::IoError);
        assert!(error.to_string().contains("denied"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("persist")
            .with_data("key", serde_json::json!("settings"));
        assert_eq!(context.operation, "persist");
        assert_eq!(context.data["key"], "settings");
    }
}
