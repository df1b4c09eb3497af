//! # Messaging Error Types
//!
//! Structured errors for decoding inbound dispatch messages and publishing
//! outbound notifications.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    #[error("Message serialization error: {message}")]
    MessageSerialization { message: String },

    #[error("Message deserialization error: {message}")]
    MessageDeserialization { message: String },

    #[error("Missing message header: {header}")]
    MissingHeader { header: String },

    #[error("Publish failed: {destination}: {message}")]
    PublishFailed {
        destination: String,
        message: String,
    },

    #[error("Internal messaging error: {message}")]
    Internal { message: String },
}

impl MessagingError {
    /// Create a message serialization error
    pub fn message_serialization(message: impl Into<String>) -> Self {
        Self::MessageSerialization {
            message: message.into(),
        }
    }

    /// Create a message deserialization error
    pub fn message_deserialization(message: impl Into<String>) -> Self {
        Self::MessageDeserialization {
            message: message.into(),
        }
    }

    pub fn missing_header(header: impl Into<String>) -> Self {
        Self::MissingHeader {
            header: header.into(),
        }
    }

    /// Create a publish error for one destination
    pub fn publish_failed(destination: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PublishFailed {
            destination: destination.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type MessagingResult<T> = Result<T, MessagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MessagingError::publish_failed("confirmations", "broker closed");
        assert_eq!(err.to_string(), "Publish failed: confirmations: broker closed");

        let err = MessagingError::missing_header("version");
        assert_eq!(err.to_string(), "Missing message header: version");
    }
}
