//! Adapters for the relay pipeline's outbound ports.

pub mod dispatcher;
pub mod sinks;

pub use dispatcher::{EventDispatcher, DEFAULT_QUEUE_CAPACITY};
pub use sinks::{InMemoryEventStore, JsonLinesEventStore};
