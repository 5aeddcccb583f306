//! # Shared Crypto - Envelope Cryptography
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | AES-256-CBC, PKCS#7 | Payload confidentiality |
//! | `hashing` | HMAC-SHA256 | Envelope integrity, key derivation |
//! | `codec` | Encrypt-then-MAC | Sealing and opening relay envelopes |
//!
//! ## Security Properties
//!
//! - **Encrypt-then-MAC**: the tag covers `iv ‖ ciphertext`
//! - **Verify first**: unauthenticated ciphertext is never decrypted
//! - **Constant-time tag comparison**
//! - **Separated subkeys**: encryption and MAC keys are derived independently
//!   from the provisioned secret and zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod errors;
pub mod hashing;
pub mod symmetric;

// Re-exports
pub use codec::{Codec, KeyMaterial, MIN_SECRET_LEN};
pub use errors::CryptoError;
pub use hashing::{derive_key, hmac_sha256, verify_hmac_sha256};
pub use symmetric::{Iv, SecretKey, BLOCK_LEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
