//! # Attack Simulations
//!
//! Each module plays an attacker with access to the transport but not to
//! the provisioned secret.
//!
//! - `tampering`: modify envelopes in flight
//! - `replay`: resend captured envelopes

pub mod replay;
pub mod tampering;
