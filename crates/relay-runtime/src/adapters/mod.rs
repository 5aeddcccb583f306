//! # Adapter Implementations
//!
//! Concrete implementations of the pipeline's outbound ports that need the
//! runtime's infrastructure.

pub mod bus_transport;

pub use bus_transport::BusTransport;
