//! Ports (hexagonal architecture).

pub mod inbound;
pub mod outbound;

pub use inbound::RelayApi;
pub use outbound::{EventSink, ManualTimeSource, RelayTransport, SystemTimeSource, TimeSource};
