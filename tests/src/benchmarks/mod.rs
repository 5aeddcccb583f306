//! # Relay Benchmarks
//!
//! Criterion benchmark bodies, registered from `benches/relay_benchmarks.rs`.
//!
//! | Component | Hot Path | Target |
//! |-----------|----------|--------|
//! | Codec | seal 256 B telemetry | < 20μs |
//! | Codec | verify + open 256 B telemetry | < 20μs |
//! | Replay Window | admit into a full window of 100 | < 5μs |

pub mod codec;
pub mod window;
