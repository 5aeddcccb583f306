//! # Integration Tests
//!
//! The relay runtime wired over the in-memory bus, exercised from the
//! outside: senders publish on ingress channels and receivers read the
//! outbound channels.

pub mod relay_flows;
