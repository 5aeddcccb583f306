//! Relay error types.
//!
//! Policy violations are not errors: they end as
//! [`RelayOutcome::Rejected`](super::RelayOutcome). These are the failures
//! that lose a message without a detection event.

use shared_crypto::CryptoError;
use shared_types::TransportError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Re-encryption for the destination leg failed.
    #[error("Outbound sealing failed: {0}")]
    Seal(#[from] CryptoError),

    /// Destination channel refused the message.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}
