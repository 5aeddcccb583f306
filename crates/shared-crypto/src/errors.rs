//! Crypto error types.

use shared_types::EnvelopeError;
use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Recomputed MAC did not match the envelope's tag.
    #[error("Tamper detected: MAC mismatch")]
    TamperDetected,

    /// Wire form, framing or padding is invalid.
    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Provisioned secret is shorter than the minimum.
    #[error("Secret too short: need at least {minimum} bytes, got {actual}")]
    SecretTooShort {
        /// Minimum secret length in bytes
        minimum: usize,
        /// Actual secret length in bytes
        actual: usize,
    },

    /// Secret could not be decoded.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),
}

impl From<EnvelopeError> for CryptoError {
    fn from(err: EnvelopeError) -> Self {
        Self::MalformedCiphertext(err.to_string())
    }
}
