//! # Sealed Envelope
//!
//! The wire-level wrapper for every message crossing the relay.
//!
//! ## Wire Format
//!
//! ```json
//! {"iv": "<32 hex>", "ciphertext": "<hex>", "mac": "<64 hex>"}
//! ```
//!
//! ## Security Properties
//!
//! - **Encrypt-then-MAC**: `mac` covers `iv ‖ ciphertext`.
//! - **Verify before decrypt**: receivers recompute `mac` before touching
//!   `ciphertext`. Parsing an envelope performs no cryptography.

use crate::errors::EnvelopeError;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

/// Initialization vector length in bytes.
pub const IV_LEN: usize = 16;

/// HMAC-SHA256 tag length in bytes.
pub const MAC_LEN: usize = 32;

/// Authentication tag over `iv ‖ ciphertext`.
pub type MacTag = [u8; MAC_LEN];

/// An encrypted, authenticated message as it travels on the wire.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEnvelope {
    /// Per-message random IV.
    #[serde_as(as = "Hex")]
    pub iv: [u8; IV_LEN],

    /// Plaintext encrypted under the shared key and `iv`.
    #[serde_as(as = "Hex")]
    pub ciphertext: Vec<u8>,

    /// Tag over `iv ‖ ciphertext`.
    #[serde_as(as = "Hex")]
    pub mac: MacTag,
}

impl SealedEnvelope {
    /// Parse the hex JSON wire form.
    ///
    /// Non-JSON input, non-hex fields and wrong IV or MAC lengths are all
    /// reported as [`EnvelopeError::Malformed`].
    pub fn from_json(raw: &[u8]) -> Result<Self, EnvelopeError> {
        serde_json::from_slice(raw).map_err(|e| EnvelopeError::Malformed(e.to_string()))
    }

    /// Render the hex JSON wire form.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, EnvelopeError> {
        serde_json::to_vec(self).map_err(|e| EnvelopeError::Encode(e.to_string()))
    }

    /// The bytes covered by `mac`.
    #[must_use]
    pub fn authenticated_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(IV_LEN + self.ciphertext.len());
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext);
        bytes
    }

    /// Hex rendering of the tag, for logs and detection events.
    #[must_use]
    pub fn mac_hex(&self) -> String {
        hex::encode(self.mac)
    }
}
