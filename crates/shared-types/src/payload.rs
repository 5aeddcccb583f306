//! # Payload Header
//!
//! The relay reads exactly one field from a decrypted plaintext: the
//! sender-embedded `originTimestamp`. Everything else is opaque and is
//! forwarded byte-for-byte.

use crate::entities::Timestamp;
use crate::errors::PayloadError;
use serde::{Deserialize, Serialize};

/// JSON key carrying the sender's clock reading.
pub const ORIGIN_TIMESTAMP_FIELD: &str = "originTimestamp";

/// The part of a plaintext the relay understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadHeader {
    /// Epoch milliseconds at which the sender produced the message.
    #[serde(rename = "originTimestamp")]
    pub origin_timestamp: Timestamp,
}

impl PayloadHeader {
    /// Extract the header from a plaintext.
    pub fn parse(plaintext: &[u8]) -> Result<Self, PayloadError> {
        let value: serde_json::Value = serde_json::from_slice(plaintext)
            .map_err(|e| PayloadError::NotAnObject(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| PayloadError::NotAnObject("top-level value is not an object".into()))?;
        let origin_timestamp = object
            .get(ORIGIN_TIMESTAMP_FIELD)
            .and_then(serde_json::Value::as_u64)
            .ok_or(PayloadError::MissingOriginTimestamp)?;
        Ok(Self { origin_timestamp })
    }

    /// Build a plaintext from `body` with `originTimestamp` set to `origin`.
    ///
    /// A non-object `body` is wrapped as `{"data": body}`.
    #[must_use]
    pub fn stamp(body: serde_json::Value, origin: Timestamp) -> Vec<u8> {
        let mut object = match body {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".into(), other);
                map
            }
        };
        object.insert(ORIGIN_TIMESTAMP_FIELD.into(), origin.into());
        // A Map of Values always serializes.
        serde_json::to_vec(&object).unwrap_or_default()
    }
}
