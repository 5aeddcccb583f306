//! # Shared Types Crate
//!
//! This crate contains the types that cross crate boundaries in the relay:
//! the sealed wire envelope, the plaintext payload header, relay directions
//! and transport channels, and the detection events handed to event sinks.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-crate types are defined here.
//! - **Envelope Integrity**: `SealedEnvelope` is the only wire representation
//!   of a relayed message; nothing else crosses the transport.
//! - **Sender Time Is Authoritative**: the `originTimestamp` embedded by the
//!   producer drives both replay matching and the latency budget.

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod payload;
pub mod security;

pub use entities::*;
pub use envelope::{MacTag, SealedEnvelope, IV_LEN, MAC_LEN};
pub use errors::*;
pub use payload::{PayloadHeader, ORIGIN_TIMESTAMP_FIELD};
pub use security::*;
