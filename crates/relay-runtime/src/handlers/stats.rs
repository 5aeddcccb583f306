//! # Stats Reporter
//!
//! Periodically copies pipeline counters into gauges and logs one line.

use std::sync::Arc;
use std::time::Duration;

use relay_pipeline::{RelayApi, RelaySnapshot};
use relay_telemetry::{log_event, EVENTS_DROPPED, EVENT_SINK_FAILURES, REPLAY_WINDOW_ENTRIES};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Periodic stats task.
pub struct StatsReporter<A: RelayApi> {
    relay: Arc<A>,
    period: Duration,
}

impl<A: RelayApi + 'static> StatsReporter<A> {
    pub fn new(relay: Arc<A>, period: Duration) -> Self {
        Self { relay, period }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    report(&self.relay.snapshot());
                }
            }
        }
        report(&self.relay.snapshot());
    }
}

/// Update gauges from `snapshot` and log it.
pub fn report(snapshot: &RelaySnapshot) {
    REPLAY_WINDOW_ENTRIES.set(snapshot.window.len as f64);
    EVENTS_DROPPED.set(snapshot.events.dropped as f64);
    EVENT_SINK_FAILURES.set(snapshot.events.failed as f64);

    log_event!(
        info,
        "stats",
        "Relay stats",
        received = snapshot.relay.received,
        forwarded = snapshot.relay.forwarded,
        tamper = snapshot.relay.tamper_rejected,
        replay = snapshot.relay.replay_rejected,
        stale = snapshot.relay.stale_rejected,
        transport_failures = snapshot.relay.transport_failures,
        window_len = snapshot.window.len,
        events_dropped = snapshot.events.dropped,
        events_failed = snapshot.events.failed
    );
}
