//! # Domain Layer - Relay Pipeline
//!
//! Pure policy logic with no I/O.
//!
//! ## Components
//!
//! - `window`: ReplayWindow, the only shared mutable state
//! - `latency`: LatencyGate and the free `check` function
//! - `entities`: RelayPolicy, RelayOutcome, Rejection, counters
//! - `errors`: RelayError

pub mod entities;
pub mod errors;
pub mod latency;
pub mod window;

pub use entities::*;
pub use errors::*;
pub use latency::{LatencyGate, LatencyOutcome};
pub use window::{AdmitOutcome, Fingerprint, ReplayWindow, WindowStats};
