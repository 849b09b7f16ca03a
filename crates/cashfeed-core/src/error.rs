//! Error types for cashfeed-core
//!
//! Fetch and save failures are caught at the coordinator and forecast
//! boundaries, logged, and kept on the feed state as a non-fatal flag. They
//! are still returned to the caller so it can decide whether to retry.

use cashfeed_config::ConfigError;
use cashfeed_store::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Page or forecast fetch failed
    FetchFailed,
    /// Forecast persistence failed
    SaveFailed,
    /// No signed-in user at call time
    AuthMissing,
    /// Input rejected before any store call
    ValidationError,
    /// Configuration error
    ConfigError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::FetchFailed => write!(f, "FETCH_FAILED"),
            ErrorCode::SaveFailed => write!(f, "SAVE_FAILED"),
            ErrorCode::AuthMissing => write!(f, "AUTH_MISSING"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
        }
    }
}

/// Detailed error information, also kept as the feed's last-error flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Offending input field (validation errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
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
            field: None,
            suggestions: vec![],
        }
    }

    /// Add field information
    pub fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
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
        if let Some(ref field) = self.field {
            write!(f, "\nField: {}", field)?;
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
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for cashfeed-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    #[error("Save failed: {message}")]
    Save { message: String },

    #[error("No signed-in user")]
    AuthMissing,

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Wrap a store failure that happened while reading
    pub fn fetch(error: StoreError) -> Self {
        CoreError::Fetch {
            message: error.to_string(),
        }
    }

    /// Wrap a store failure that happened while writing
    pub fn save(error: StoreError) -> Self {
        CoreError::Save {
            message: error.to_string(),
        }
    }

    pub fn validation(field: &str, message: &str) -> Self {
        CoreError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Fetch { .. } => ErrorCode::FetchFailed,
            CoreError::Save { .. } => ErrorCode::SaveFailed,
            CoreError::AuthMissing => ErrorCode::AuthMissing,
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Fetch { .. } => ErrorSeverity::Warning,
            CoreError::Save { .. } => ErrorSeverity::Error,
            CoreError::AuthMissing => ErrorSeverity::Info,
            CoreError::Validation { .. } => ErrorSeverity::Info,
            CoreError::Config { .. } => ErrorSeverity::Critical,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Fetch { .. } => {
                details = details.with_suggestion(
                    "Scroll to the end of the feed again or retry the load.".to_string(),
                );
            }
            CoreError::Save { .. } => {
                details = details.with_suggestion(
                    "Nothing was written; submit the forecast again.".to_string(),
                );
            }
            CoreError::AuthMissing => {
                details = details.with_suggestion("Sign in to load the feed.".to_string());
            }
            CoreError::Validation { field, .. } => {
                details = details.with_field(field.clone());
            }
            CoreError::Config { message } => {
                details = details.with_suggestion(message.clone());
            }
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<ConfigError> for CoreError {
    fn from(error: ConfigError) -> Self {
        CoreError::Config {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// User the operation ran for
    pub user_id: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            user_id: None,
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    /// Add user ID
    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        let line = format!(
            "[{}] {} - Operation: {} - User: {:?} - Data: {}",
            error.code(),
            error,
            context.operation,
            context.user_id,
            context.data
        );
        match error.severity() {
            ErrorSeverity::Info => log::info!(target: "cashfeed::error", "{}", line),
            ErrorSeverity::Warning => log::warn!(target: "cashfeed::error", "{}", line),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                log::error!(target: "cashfeed::error", "{}", line)
            }
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "cashfeed::error",
            "WARNING: {} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.user_id
        );
    }
}

// ==================== Tests ====================
