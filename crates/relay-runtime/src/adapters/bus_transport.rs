//! # Bus Transport Adapter
//!
//! Implements `RelayTransport` on top of the in-memory bus. A publish that
//! reaches no subscription on the destination channel is reported as
//! `TransportError::NoSubscribers` so the pipeline can count it as lost.

use std::sync::Arc;

use async_trait::async_trait;
use relay_pipeline::RelayTransport;
use shared_bus::{BusPublisher, InMemoryBus};
use shared_types::{Channel, TransportError};

/// Publishes forwarded traffic on the bus.
pub struct BusTransport {
    bus: Arc<InMemoryBus>,
}

impl BusTransport {
    pub fn new(bus: Arc<InMemoryBus>) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &Arc<InMemoryBus> {
        &self.bus
    }
}

#[async_trait]
impl RelayTransport for BusTransport {
    async fn publish(&self, channel: Channel, payload: Vec<u8>) -> Result<(), TransportError> {
        match self.bus.publish(channel, payload).await {
            0 => Err(TransportError::NoSubscribers { channel }),
            _ => Ok(()),
        }
    }
}
