//! # Ingress Handler
//!
//! One handler per direction. It owns the subscription to that direction's
//! ingress channel and runs every message through the pipeline in its own
//! task, so a slow publish never holds up the next message. At most
//! `max_in_flight` tasks run at once; past that the handler stops reading
//! and the bus buffers.

use std::sync::Arc;

use relay_pipeline::{RelayApi, RelayError, RelayOutcome};
use relay_telemetry::{
    metric_inc, metric_observe, time_histogram, MESSAGES_FORWARDED, MESSAGES_RECEIVED,
    MESSAGES_REJECTED, MESSAGE_AGE, PROCESSING_DURATION, TRANSPORT_FAILURES,
};
use shared_bus::{BusMessage, Subscription};
use shared_types::Direction;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Drives one direction of the relay.
pub struct IngressHandler<A: RelayApi> {
    direction: Direction,
    subscription: Subscription,
    relay: Arc<A>,
    permits: Arc<Semaphore>,
}

impl<A: RelayApi + 'static> IngressHandler<A> {
    /// `subscription` should select `direction.ingress()` only.
    pub fn new(
        direction: Direction,
        subscription: Subscription,
        relay: Arc<A>,
        max_in_flight: usize,
    ) -> Self {
        Self {
            direction,
            subscription,
            relay,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Run until shutdown is signalled or the bus closes, then wait for
    /// in-flight messages.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let direction = self.direction;
        info!(direction = %direction, channel = %direction.ingress(), "Ingress handler started");

        let mut in_flight = JoinSet::new();
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(direction = %direction, "Shutdown signal received");
                        break;
                    }
                }
                message = self.subscription.recv(), if self.permits.available_permits() > 0 => {
                    let Some(message) = message else {
                        warn!(direction = %direction, "Ingress subscription closed");
                        break;
                    };
                    // Only this loop acquires, so a permit is free here.
                    let Ok(permit) = Arc::clone(&self.permits).acquire_owned().await else {
                        break;
                    };
                    let relay = Arc::clone(&self.relay);
                    in_flight.spawn(async move {
                        handle_message(relay, direction, message).await;
                        drop(permit);
                    });
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        error!(direction = %direction, error = %e, "Relay task failed");
                    }
                }
            }
        }

        let pending = in_flight.len();
        if pending > 0 {
            debug!(direction = %direction, pending, "Waiting for in-flight messages");
        }
        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                error!(direction = %direction, error = %e, "Relay task failed");
            }
        }
        info!(direction = %direction, "Ingress handler stopped");
    }
}

/// Relay one bus message and record its metrics.
pub async fn handle_message<A: RelayApi>(relay: Arc<A>, direction: Direction, message: BusMessage) {
    let span = info_span!("relay", message_id = %message.id, direction = %direction);
    async move {
        let label = direction.label();
        metric_inc!(MESSAGES_RECEIVED, &[label]);
        let _timer = time_histogram!(PROCESSING_DURATION.with_label_values(&[label]));

        match relay.relay(direction, &message.payload).await {
            Ok(RelayOutcome::Forwarded { age_ms, .. }) => {
                metric_inc!(MESSAGES_FORWARDED, &[label]);
                metric_observe!(MESSAGE_AGE, age_ms as f64 / 1000.0);
            }
            Ok(RelayOutcome::Rejected(rejection)) => {
                metric_inc!(MESSAGES_REJECTED, &[label, rejection.detection_kind().as_str()]);
            }
            Err(RelayError::Transport(e)) => {
                metric_inc!(TRANSPORT_FAILURES, &[label]);
                debug!(error = %e, "Forwarded message lost");
            }
            Err(RelayError::Seal(e)) => {
                error!(error = %e, "Failed to re-seal message for destination");
            }
        }
    }
    .instrument(span)
    .await
}
