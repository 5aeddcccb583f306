//! # Relay Pipeline
//!
//! Authenticates, de-duplicates and latency-checks every message crossing
//! between the device population and the cloud, then re-encrypts it for the
//! opposite leg.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | MAC verified before any decryption | `shared_crypto::Codec::decrypt` |
//! | Window length never exceeds capacity | `domain/window.rs` - `admit()` evicts front |
//! | At most one `Fresh` per MAC within the horizon | `domain/window.rs` - scan and append under one lock |
//! | Relay output cannot be reflected back in | `service.rs` - outbound MAC admitted before publish |
//! | Exactly one detection event per rejection | `service.rs` - each early exit dispatches once |
//! | Event sink never blocks or alters decisions | `adapters/dispatcher.rs` - `try_send` + background worker |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - event dispatcher, in-memory and JSON-lines sinks   │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - RelayApi trait                             │
//! │  ports/outbound.rs - RelayTransport, EventSink, TimeSource      │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/window.rs   - ReplayWindow (shared, bounded)            │
//! │  domain/latency.rs  - LatencyGate                               │
//! │  domain/entities.rs - RelayPolicy, RelayOutcome, counters       │
//! │  domain/errors.rs   - RelayError                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//!
//! The replay check runs before the latency check, so a stale message still
//! occupies a window slot. A forwarded message occupies two: its own MAC
//! and the MAC of the re-sealed copy.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
pub use service::{LegCodecs, RelayService};

/// Default replay window capacity.
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Default replay horizon in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 5000;

/// Default latency ceiling in milliseconds.
pub const DEFAULT_LATENCY_CEILING_MS: u64 = 5000;
