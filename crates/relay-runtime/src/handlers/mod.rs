//! # Event Handlers
//!
//! Long-running tasks driven by the bus and by timers.

pub mod ingress;
pub mod stats;

pub use ingress::IngressHandler;
pub use stats::StatsReporter;
