//! Outbound (Driven) ports for the relay pipeline.
//!
//! These traits define what the pipeline needs from the outside world: a
//! place to publish forwarded traffic, a place to record detection events,
//! and a clock.

use async_trait::async_trait;
use shared_types::{Channel, DetectionEvent, PersistenceError, Timestamp, TransportError};
use std::sync::atomic::{AtomicU64, Ordering};

/// Destination-side transport.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    /// Publish a sealed wire payload on `channel`.
    ///
    /// # Errors
    /// * `TransportError::NoSubscribers` - nothing listens on `channel`
    /// * `TransportError::Closed` - the transport has shut down
    async fn publish(&self, channel: Channel, payload: Vec<u8>) -> Result<(), TransportError>;
}

/// Durable record of security events.
///
/// Called off the relay path by the event dispatcher; a slow or failing
/// sink never affects forwarding decisions.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Append one event.
    async fn record(&self, event: DetectionEvent) -> Result<(), PersistenceError>;
}

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        shared_types::current_timestamp_ms()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_source() {
        let source = SystemTimeSource;
        let now = source.now();

        // Should be a reasonable timestamp (after year 2020)
        assert!(now > 1577836800000); // Jan 1, 2020 in ms
    }

    #[test]
    fn test_manual_time_source() {
        let source = ManualTimeSource::new(1000);
        assert_eq!(source.now(), 1000);

        source.advance(500);
        assert_eq!(source.now(), 1500);

        source.set(3000);
        assert_eq!(source.now(), 3000);
    }
}
