//! # Relay Container
//!
//! Builds every long-lived component once and hands out shared references.
//!
//! ## Build Order
//!
//! 1. Codecs from the configured key material
//! 2. Event sink and its dispatcher (needs a running tokio runtime)
//! 3. Bus and the transport adapter over it
//! 4. Relay service holding the shared replay window

pub mod config;

pub use config::{
    ConfigError, LatencyConfig, RelayConfig, SecurityConfig, SinkConfig, SinkKind, WindowConfig,
    DEFAULT_MAX_IN_FLIGHT,
};

use std::sync::Arc;

use relay_pipeline::{
    EventDispatcher, EventSink, InMemoryEventStore, JsonLinesEventStore, LegCodecs, RelayService,
    SystemTimeSource,
};
use shared_bus::InMemoryBus;
use shared_crypto::{Codec, CryptoError};
use shared_types::PersistenceError;
use thiserror::Error;
use tracing::info;

use crate::adapters::BusTransport;

/// The concrete pipeline type the runtime drives.
pub type RuntimeRelay = RelayService<BusTransport, SystemTimeSource>;

/// Errors while assembling the container.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to derive codec keys: {0}")]
    Crypto(#[from] CryptoError),

    #[error("failed to open event sink: {0}")]
    Sink(#[from] PersistenceError),
}

/// Long-lived relay components.
pub struct RelayContainer {
    pub config: RelayConfig,
    pub bus: Arc<InMemoryBus>,
    pub relay: Arc<RuntimeRelay>,
    pub events: Arc<EventDispatcher>,
    /// Set when the sink is [`SinkKind::Memory`].
    pub memory_store: Option<Arc<InMemoryEventStore>>,
}

impl RelayContainer {
    /// Build on a fresh in-memory bus.
    pub async fn build(config: RelayConfig) -> Result<Self, ContainerError> {
        Self::build_with_bus(config, Arc::new(InMemoryBus::new())).await
    }

    /// Build around an existing bus.
    pub async fn build_with_bus(
        config: RelayConfig,
        bus: Arc<InMemoryBus>,
    ) -> Result<Self, ContainerError> {
        config.validate()?;

        let codecs = build_codecs(&config.security)?;

        let (sink, memory_store) = match config.sink.kind {
            SinkKind::Memory => {
                let store = Arc::new(InMemoryEventStore::new());
                (store.clone() as Arc<dyn EventSink>, Some(store))
            }
            SinkKind::JsonLines => {
                let store = JsonLinesEventStore::open(&config.sink.path).await?;
                info!(path = %config.sink.path.display(), "Detection events append to file");
                (Arc::new(store) as Arc<dyn EventSink>, None)
            }
        };
        let events = Arc::new(EventDispatcher::spawn(sink, config.sink.queue_capacity));

        let transport = Arc::new(BusTransport::new(Arc::clone(&bus)));
        let relay = Arc::new(RelayService::new(
            codecs,
            config.policy(),
            transport,
            Arc::new(SystemTimeSource),
            Arc::clone(&events),
        ));

        info!(
            window_size = config.window.window_size,
            max_delay_ms = config.window.max_delay_ms,
            ceiling_ms = config.latency.ceiling_ms,
            max_in_flight = config.max_in_flight,
            split_keys = config.security.cloud_secret.is_some(),
            "Relay container built"
        );

        Ok(Self {
            config,
            bus,
            relay,
            events,
            memory_store,
        })
    }
}

fn build_codecs(security: &SecurityConfig) -> Result<LegCodecs, CryptoError> {
    let device = Codec::new(&security.shared_secret)?;
    Ok(match &security.cloud_secret {
        Some(cloud) => LegCodecs::split(device, Codec::new(cloud)?),
        None => LegCodecs::shared(device),
    })
}
