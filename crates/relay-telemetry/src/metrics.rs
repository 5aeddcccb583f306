//! Prometheus metrics for the relay.
//!
//! All metrics follow the naming convention: `relay_<area>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., messages_received_total)
//! - **Gauge**: Value that can go up or down (e.g., replay_window_entries)
//! - **Histogram**: Distribution of values (e.g., message_age_seconds)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PIPELINE METRICS
    // =========================================================================

    /// Messages taken off an ingress channel
    pub static ref MESSAGES_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("relay_messages_received_total", "Messages received from ingress channels"),
        &["direction"]
    ).expect("metric creation failed");

    /// Messages re-encrypted and published to the opposite leg
    pub static ref MESSAGES_FORWARDED: CounterVec = CounterVec::new(
        Opts::new("relay_messages_forwarded_total", "Messages forwarded to the destination channel"),
        &["direction"]
    ).expect("metric creation failed");

    /// Messages dropped by policy
    pub static ref MESSAGES_REJECTED: CounterVec = CounterVec::new(
        Opts::new("relay_messages_rejected_total", "Messages rejected by the relay"),
        &["direction", "kind"]  // kind: TamperDetected/ReplayDetected/StalenessExceeded
    ).expect("metric creation failed");

    /// Messages lost because the destination refused them
    pub static ref TRANSPORT_FAILURES: CounterVec = CounterVec::new(
        Opts::new("relay_transport_failures_total", "Publish failures on the destination channel"),
        &["direction"]
    ).expect("metric creation failed");

    /// Sender-to-relay age of forwarded messages
    pub static ref MESSAGE_AGE: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "relay_message_age_seconds",
            "Age of forwarded messages measured from their origin timestamp"
        ).buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])
    ).expect("metric creation failed");

    /// Time spent inside the pipeline per message
    pub static ref PROCESSING_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "relay_processing_duration_seconds",
            "Time spent authenticating, checking and forwarding one message"
        ).buckets(vec![0.00005, 0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.05]),
        &["direction"]
    ).expect("metric creation failed");

    // =========================================================================
    // REPLAY WINDOW METRICS
    // =========================================================================

    /// Fingerprints currently retained
    pub static ref REPLAY_WINDOW_ENTRIES: Gauge = Gauge::new(
        "relay_replay_window_entries",
        "Fingerprints currently held in the replay window"
    ).expect("metric creation failed");

    // =========================================================================
    // EVENT SINK METRICS
    // =========================================================================

    /// Detection events the sink failed to store
    pub static ref EVENT_SINK_FAILURES: Gauge = Gauge::new(
        "relay_event_sink_failures",
        "Detection events the sink failed to persist since start"
    ).expect("metric creation failed");

    /// Detection events dropped before reaching the sink
    pub static ref EVENTS_DROPPED: Gauge = Gauge::new(
        "relay_events_dropped",
        "Detection events dropped because the dispatch queue was full or closed"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Calling this more than once is harmless.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Pipeline
        Box::new(MESSAGES_RECEIVED.clone()),
        Box::new(MESSAGES_FORWARDED.clone()),
        Box::new(MESSAGES_REJECTED.clone()),
        Box::new(TRANSPORT_FAILURES.clone()),
        Box::new(MESSAGE_AGE.clone()),
        Box::new(PROCESSING_DURATION.clone()),
        // Window
        Box::new(REPLAY_WINDOW_ENTRIES.clone()),
        // Events
        Box::new(EVENT_SINK_FAILURES.clone()),
        Box::new(EVENTS_DROPPED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}

/// Start timing for a histogram. Observation happens on drop.
#[macro_export]
macro_rules! time_histogram {
    ($histogram:expr) => {
        $crate::metrics::HistogramTimer::new(&$histogram)
    };
}
