//! Error handling module for driver-selection
//!
//! Component errors (`StoreError`, `SetError`, `CodecError`) live next to the
//! code that raises them. `SelectionError` wraps them for callers that work at
//! the application level: config loading, the command line, the watcher.

use thiserror::Error;

use crate::selection::SetError;
use crate::store::StoreError;

/// Main error type for driver-selection
#[derive(Error, Debug)]
pub enum SelectionError {
    /// IO errors outside the settings store (config files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (loading, parsing, validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors (user input)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Settings store failures
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Rejected or unsaved selection changes
    #[error(transparent)]
    Set(#[from] SetError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Signal registration or delivery errors
    #[error("Signal error: {0}")]
    Signal(String),
}

/// Result type alias for driver-selection operations
pub type Result<T> = std::result::Result<T, SelectionError>;

impl SelectionError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a signal error
    pub fn signal(msg: impl Into<String>) -> Self {
        Self::Signal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DriverValue;

    #[test]
    fn test_error_display() {
        let err = SelectionError::config("driver_values must contain 'default'");
        assert_eq!(
            err.to_string(),
            "Configuration error: driver_values must contain 'default'"
        );

        let err = SelectionError::validation("selection is locked");
        assert_eq!(err.to_string(), "Validation error: selection is locked");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SelectionError = io_err.into();
        assert!(matches!(err, SelectionError::Io(_)));
    }

    #[test]
    fn test_set_error_is_transparent() {
        let err: SelectionError = SetError::InvalidValue {
            package: "com.a".to_string(),
            value: DriverValue::Other("vk".to_string()),
        }
        .into();
        assert!(matches!(err, SelectionError::Set(_)));
        assert!(err.to_string().contains("com.a"));
    }
}
