//! # UAV Relay Runtime
//!
//! Wires configuration, the pipeline and the bus into a running relay.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and component construction
//! - `adapters/` - `RelayTransport` over the in-memory bus
//! - `handlers/` - ingress handlers and the stats reporter
//!
//! ## Flow
//!
//! ```text
//!  device-inbound ──▶ IngressHandler(DeviceToCloud) ──┐
//!                                                     ├──▶ RelayService ──▶ cloud-outbound
//!  cloud-inbound  ──▶ IngressHandler(CloudToDevice) ──┘        │        ──▶ device-outbound
//!                                                     shared ReplayWindow
//!                                                              │
//!                                                     EventDispatcher ──▶ EventSink
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load and validate configuration (missing secret is fatal)
//! 2. Build the container
//! 3. Subscribe one ingress handler per direction
//! 4. Start the stats reporter
//!
//! ## Shutdown Sequence
//!
//! 1. Signal every task through the `watch` channel
//! 2. Wait for handlers to finish in-flight messages
//! 3. Drain the event dispatcher into the sink

pub mod adapters;
pub mod container;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use shared_bus::{EventFilter, InMemoryBus};
use shared_types::Direction;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::container::{RelayConfig, RelayContainer};
use crate::handlers::{IngressHandler, StatsReporter};

/// How long shutdown waits for handlers before abandoning them.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The running relay.
pub struct RelayRuntime {
    container: Arc<RelayContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl RelayRuntime {
    pub fn new(container: RelayContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Build the container from `config` on a fresh bus.
    pub async fn from_config(config: RelayConfig) -> Result<Self> {
        let container = RelayContainer::build(config)
            .await
            .context("Failed to build relay container")?;
        Ok(Self::new(container))
    }

    /// Build the container from `config` on `bus`.
    pub async fn with_bus(config: RelayConfig, bus: Arc<InMemoryBus>) -> Result<Self> {
        let container = RelayContainer::build_with_bus(config, bus)
            .await
            .context("Failed to build relay container")?;
        Ok(Self::new(container))
    }

    /// Subscribe the ingress handlers and start background tasks.
    ///
    /// Messages published on an ingress channel after this returns are
    /// relayed.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  UAV Relay Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let container = &self.container;
        for direction in Direction::BOTH {
            let subscription = container
                .bus
                .subscribe(EventFilter::channel(direction.ingress()));
            let handler = IngressHandler::new(
                direction,
                subscription,
                Arc::clone(&container.relay),
                container.config.max_in_flight,
            );
            let shutdown = self.shutdown_rx.clone();
            self.tasks.lock().push(tokio::spawn(handler.run(shutdown)));
        }

        let interval = container.config.stats_interval_secs;
        if interval > 0 {
            let reporter =
                StatsReporter::new(Arc::clone(&container.relay), Duration::from_secs(interval));
            self.tasks
                .lock()
                .push(tokio::spawn(reporter.run(self.shutdown_rx.clone())));
        }

        info!(
            ingress = ?Direction::BOTH.map(|d| d.ingress()),
            stats_interval_secs = interval,
            "Relay running"
        );
        Ok(())
    }

    /// Stop handlers and flush detection events.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "Relay task ended abnormally"),
                Err(_) => warn!("Relay task did not stop within grace period"),
            }
        }

        self.container.events.shutdown().await;

        let snapshot = relay_pipeline::RelayApi::snapshot(self.container.relay.as_ref());
        info!(
            received = snapshot.relay.received,
            forwarded = snapshot.relay.forwarded,
            rejected = snapshot.relay.rejected(),
            events_persisted = snapshot.events.persisted,
            "Shutdown complete"
        );
    }

    pub fn container(&self) -> Arc<RelayContainer> {
        Arc::clone(&self.container)
    }

    pub fn bus(&self) -> Arc<InMemoryBus> {
        Arc::clone(&self.container.bus)
    }
}
