//! # Envelope Codec
//!
//! Encrypt-then-MAC over AES-256-CBC and HMAC-SHA256.
//!
//! ## Key Schedule
//!
//! The provisioned secret is never used directly. Two independent 32-byte
//! subkeys are derived from it:
//!
//! ```text
//! enc_key = HMAC-SHA256(secret, "uav-relay/v1/encryption")
//! mac_key = HMAC-SHA256(secret, "uav-relay/v1/authentication")
//! ```
//!
//! ## Decrypt Order
//!
//! 1. Recompute the MAC over `iv ‖ ciphertext` and compare in constant time.
//! 2. Only on a match, check framing and decrypt.

use crate::hashing::{derive_key, hmac_sha256, verify_hmac_sha256};
use crate::symmetric::{self, Iv, SecretKey};
use crate::CryptoError;
use shared_types::{MacTag, SealedEnvelope};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum length of a provisioned secret in bytes.
pub const MIN_SECRET_LEN: usize = 16;

const ENCRYPTION_LABEL: &[u8] = b"uav-relay/v1/encryption";
const AUTHENTICATION_LABEL: &[u8] = b"uav-relay/v1/authentication";

/// Opaque provisioned secret shared by both relay ends.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial(Vec<u8>);

impl KeyMaterial {
    /// Wrap raw secret bytes.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::SecretTooShort` below [`MIN_SECRET_LEN`] bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_SECRET_LEN {
            return Err(CryptoError::SecretTooShort {
                minimum: MIN_SECRET_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    /// Decode a hex-encoded secret.
    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(encoded.trim())
            .map_err(|e| CryptoError::InvalidKeyMaterial(e.to_string()))?;
        Self::from_bytes(bytes)
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed value.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every byte is zero.
    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyMaterial({} bytes, ***)", self.0.len())
    }
}

/// Seals plaintexts into [`SealedEnvelope`]s and opens them again.
///
/// Stateless apart from its two subkeys; safe to share across tasks.
#[derive(Clone)]
pub struct Codec {
    enc_key: SecretKey,
    mac_key: SecretKey,
}

impl Codec {
    /// Derive a codec from a provisioned secret.
    pub fn new(secret: &KeyMaterial) -> Result<Self, CryptoError> {
        let enc_key = SecretKey::from_bytes(derive_key(secret.as_bytes(), ENCRYPTION_LABEL)?);
        let mac_key = SecretKey::from_bytes(derive_key(secret.as_bytes(), AUTHENTICATION_LABEL)?);
        Ok(Self { enc_key, mac_key })
    }

    /// Build a codec from already-derived subkeys.
    pub fn from_keys(enc_key: SecretKey, mac_key: SecretKey) -> Self {
        Self { enc_key, mac_key }
    }

    /// Encrypt `plaintext` under a fresh random IV and tag the result.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<SealedEnvelope, CryptoError> {
        self.encrypt_with_iv(plaintext, Iv::generate())
    }

    /// Encrypt under a caller-chosen IV.
    ///
    /// An IV MUST NOT be reused with the same codec; this exists for known
    /// answer tests.
    pub fn encrypt_with_iv(&self, plaintext: &[u8], iv: Iv) -> Result<SealedEnvelope, CryptoError> {
        let ciphertext = symmetric::encrypt(&self.enc_key, &iv, plaintext);
        let mac = self.compute_mac(iv.as_bytes(), &ciphertext)?;
        Ok(SealedEnvelope {
            iv: *iv.as_bytes(),
            ciphertext,
            mac,
        })
    }

    /// Authenticate then decrypt.
    ///
    /// # Errors
    ///
    /// - `CryptoError::TamperDetected` if the MAC does not match. Nothing is
    ///   decrypted in this case.
    /// - `CryptoError::MalformedCiphertext` if the MAC matches but framing
    ///   or padding is invalid.
    pub fn decrypt(&self, envelope: &SealedEnvelope) -> Result<Vec<u8>, CryptoError> {
        self.verify_mac(envelope)?;
        symmetric::decrypt(
            &self.enc_key,
            &Iv::from_bytes(envelope.iv),
            &envelope.ciphertext,
        )
    }

    /// Tag over `iv ‖ ciphertext` under the MAC subkey.
    pub fn compute_mac(&self, iv: &[u8], ciphertext: &[u8]) -> Result<MacTag, CryptoError> {
        hmac_sha256(self.mac_key.as_bytes(), &[iv, ciphertext])
    }

    /// Constant-time check of `envelope.mac`.
    pub fn verify_mac(&self, envelope: &SealedEnvelope) -> Result<(), CryptoError> {
        verify_hmac_sha256(
            self.mac_key.as_bytes(),
            &[&envelope.iv, &envelope.ciphertext],
            &envelope.mac,
        )
    }

    /// Parse the hex JSON wire form without any cryptography.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::MalformedCiphertext` for any parse failure.
    pub fn decode_wire(raw: &[u8]) -> Result<SealedEnvelope, CryptoError> {
        Ok(SealedEnvelope::from_json(raw)?)
    }

    /// Encrypt and render the wire form in one step.
    pub fn encrypt_to_wire(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.encrypt(plaintext)?
            .to_json_bytes()
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
    }
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Codec(***)")
    }
}
