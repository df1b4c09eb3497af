//! # Versioned Message Envelope
//!
//! Every queue message is `{ "headers": {...}, "payload": {...} }`. The
//! `version` header selects the payload schema; other headers pass through.

use super::{MessagingError, MessagingResult};
use crate::constants::messages::VERSION_HEADER;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageHeaders(BTreeMap<String, String>);

impl MessageHeaders {
    pub fn with_version(version: &str) -> Self {
        Self::default().add_header(VERSION_HEADER, version)
    }

    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.get(VERSION_HEADER)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedMessage<P> {
    pub headers: MessageHeaders,
    pub payload: P,
}

impl<P> VersionedMessage<P> {
    pub fn new(version: &str, payload: P) -> Self {
        Self {
            headers: MessageHeaders::with_version(version),
            payload,
        }
    }
}

impl<P: Serialize> VersionedMessage<P> {
    pub fn to_json_string(&self) -> MessagingResult<String> {
        serde_json::to_string(self).map_err(|e| MessagingError::message_serialization(e.to_string()))
    }
}

impl VersionedMessage<serde_json::Value> {
    /// Parse the envelope, leaving the payload undecoded until the version is known
    pub fn parse(raw: &str) -> MessagingResult<Self> {
        serde_json::from_str(raw).map_err(|e| MessagingError::message_deserialization(e.to_string()))
    }

    pub fn required_version(&self) -> MessagingResult<&str> {
        self.headers
            .version()
            .ok_or_else(|| MessagingError::missing_header(VERSION_HEADER))
    }

    pub fn decode_payload<T: DeserializeOwned>(&self) -> MessagingResult<T> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| MessagingError::message_deserialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let message = VersionedMessage::new("2", json!({"entries": []}));
        let value: serde_json::Value =
            serde_json::from_str(&message.to_json_string().unwrap()).unwrap();
        assert_eq!(value, json!({"headers": {"version": "2"}, "payload": {"entries": []}}));
    }

    #[test]
    fn test_parse_keeps_extra_headers() {
        let raw = r#"{"headers":{"version":"1","traceId":"abc"},"payload":{}}"#;
        let message = VersionedMessage::parse(raw).unwrap();
        assert_eq!(message.required_version().unwrap(), "1");
        assert_eq!(message.headers.get("traceId"), Some("abc"));
    }

    #[test]
    fn test_missing_version_header() {
        let message = VersionedMessage::parse(r#"{"headers":{},"payload":{}}"#).unwrap();
        assert_eq!(
            message.required_version().unwrap_err(),
            MessagingError::missing_header("version")
        );
        assert!(VersionedMessage::parse("not json").is_err());
    }
}
