//! # HMAC-SHA256
//!
//! Message authentication and key derivation.
//!
//! Verification uses the constant-time comparison from the `hmac` crate.

use crate::CryptoError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared_types::MacTag;

type HmacSha256 = Hmac<Sha256>;

fn keyed(key: &[u8], parts: &[&[u8]]) -> Result<HmacSha256, CryptoError> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| CryptoError::InvalidKeyMaterial(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac)
}

/// HMAC-SHA256 over the concatenation of `parts`.
pub fn hmac_sha256(key: &[u8], parts: &[&[u8]]) -> Result<MacTag, CryptoError> {
    Ok(keyed(key, parts)?.finalize().into_bytes().into())
}

/// Recompute the tag over `parts` and compare with `tag` in constant time.
///
/// # Errors
///
/// Returns `CryptoError::TamperDetected` on mismatch.
pub fn verify_hmac_sha256(key: &[u8], parts: &[&[u8]], tag: &[u8]) -> Result<(), CryptoError> {
    keyed(key, parts)?
        .verify_slice(tag)
        .map_err(|_| CryptoError::TamperDetected)
}

/// Derive a 32-byte subkey bound to `label`: `HMAC-SHA256(secret, label)`.
pub fn derive_key(secret: &[u8], label: &[u8]) -> Result<[u8; 32], CryptoError> {
    hmac_sha256(secret, &[label])
}
