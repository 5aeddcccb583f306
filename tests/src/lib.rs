//! # UAV Relay Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Shared fixtures: harness, recording transport
//! ├── benchmarks/       # Criterion benchmarks (run from benches/)
//! │   ├── codec.rs
//! │   └── window.rs
//! │
//! ├── exploits/         # Attack simulations
//! │   ├── tampering.rs  # Bit flips, forged MACs, key confusion
//! │   └── replay.rs     # Floods, cross-leg replays, eviction limits
//! │
//! └── integration/      # Runtime wired over the in-memory bus
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p relay-tests
//!
//! # By category
//! cargo test -p relay-tests integration::
//! cargo test -p relay-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p relay-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod benchmarks;
pub mod exploits;
pub mod integration;
pub mod support;
