//! # Error Types
//!
//! Defines error types shared across the relay crates.

use crate::entities::Channel;
use thiserror::Error;

/// Errors parsing or rendering the wire envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// Not valid JSON, non-hex field, or wrong IV/MAC length.
    #[error("Malformed envelope: {0}")]
    Malformed(String),

    /// Serialization failed.
    #[error("Envelope encoding failed: {0}")]
    Encode(String),
}

/// Errors reading the plaintext header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// Plaintext is not a JSON object.
    #[error("Payload is not a JSON object: {0}")]
    NotAnObject(String),

    /// `originTimestamp` absent or not an unsigned integer.
    #[error("Payload has no numeric originTimestamp")]
    MissingOriginTimestamp,
}

/// Errors publishing to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Nobody is listening on the destination channel.
    #[error("No subscribers on channel {channel}")]
    NoSubscribers { channel: Channel },

    /// Outbound envelope could not be encoded.
    #[error("Failed to encode outbound message: {0}")]
    Encode(String),

    /// Transport has shut down.
    #[error("Transport closed")]
    Closed,
}

/// Errors recording detection events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Underlying store I/O failed.
    #[error("Event store I/O error: {0}")]
    Io(String),

    /// Event could not be serialized.
    #[error("Event serialization failed: {0}")]
    Serialization(String),

    /// Store is not accepting writes.
    #[error("Event store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
