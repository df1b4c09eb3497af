//! # Error Types
//!
//! Crate-level error handling for the submission core. Each collaborator
//! boundary has its own error enum (`StorageError`, `FilingError`,
//! `MessagingError`, `ConfigurationError`); `SubmitError` is the umbrella
//! returned by the public entry points (dispatch consumer, assembler,
//! scheduler tasks).

use crate::config::ConfigurationError;
use crate::filing::FilingError;
use crate::messaging::MessagingError;
use crate::storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Filing authority error: {0}")]
    Filing(#[from] FilingError),

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Unsupported message version '{version}' for {message_type}")]
    UnsupportedMessageVersion {
        message_type: String,
        version: String,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SubmitError {
    pub fn unsupported_version(message_type: impl Into<String>, version: impl Into<String>) -> Self {
        Self::UnsupportedMessageVersion {
            message_type: message_type.into(),
            version: version.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<serde_json::Error> for SubmitError {
    fn from(error: serde_json::Error) -> Self {
        SubmitError::Validation(format!("JSON serialization error: {error}"))
    }
}

pub type SubmitResult<T> = std::result::Result<T, SubmitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_display() {
        let err = SubmitError::unsupported_version("dispatch", "7");
        let display = format!("{err}");
        assert!(display.contains("Unsupported message version"));
        assert!(display.contains("'7'"));
        assert!(display.contains("dispatch"));
    }

    #[test]
    fn test_storage_error_converts() {
        let err: SubmitError = StorageError::not_found("a/b/c").into();
        assert!(matches!(err, SubmitError::Storage(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_json_error_converts_to_validation() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: SubmitError = json_err.into();
        assert!(matches!(err, SubmitError::Validation(_)));
    }
}
