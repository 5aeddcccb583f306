//! Relay policy, outcomes and counters.

use crate::domain::window::WindowStats;
use crate::{DEFAULT_LATENCY_CEILING_MS, DEFAULT_MAX_DELAY_MS, DEFAULT_WINDOW_SIZE};
use serde::{Deserialize, Serialize};
use shared_types::{Channel, DetectionKind, Timestamp};
use std::sync::atomic::{AtomicU64, Ordering};

/// Tunables fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayPolicy {
    /// Replay window capacity in fingerprints.
    pub window_size: usize,
    /// Replay horizon in milliseconds.
    pub max_delay_ms: u64,
    /// Maximum accepted message age in milliseconds.
    pub latency_ceiling_ms: u64,
}

impl Default for RelayPolicy {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            latency_ceiling_ms: DEFAULT_LATENCY_CEILING_MS,
        }
    }
}

/// Why a message was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    TamperDetected,
    ReplayDetected,
    Stale,
}

impl Rejection {
    /// Event kind recorded for this rejection.
    pub fn detection_kind(&self) -> DetectionKind {
        match self {
            Self::TamperDetected => DetectionKind::TamperDetected,
            Self::ReplayDetected => DetectionKind::ReplayDetected,
            Self::Stale => DetectionKind::StalenessExceeded,
        }
    }
}

/// Sub-cause of a tamper rejection, carried as `reason` in the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TamperReason {
    /// Wire document unparseable.
    MalformedEnvelope,
    /// Tag did not verify.
    MacMismatch,
    /// Tag verified but framing or padding is invalid.
    MalformedCiphertext,
    /// Plaintext lacks a numeric `originTimestamp`.
    MalformedPayload,
}

impl TamperReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedEnvelope => "malformed envelope",
            Self::MacMismatch => "mac mismatch",
            Self::MalformedCiphertext => "malformed ciphertext",
            Self::MalformedPayload => "malformed payload",
        }
    }
}

/// Terminal state of one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Forwarded {
        destination: Channel,
        origin_timestamp: Timestamp,
        age_ms: u64,
    },
    Rejected(Rejection),
}

impl RelayOutcome {
    pub fn is_forwarded(&self) -> bool {
        matches!(self, Self::Forwarded { .. })
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected(r) => Some(*r),
            Self::Forwarded { .. } => None,
        }
    }
}

/// Live per-service counters.
#[derive(Debug, Default)]
pub struct RelayStats {
    received: AtomicU64,
    forwarded: AtomicU64,
    tamper_rejected: AtomicU64,
    replay_rejected: AtomicU64,
    stale_rejected: AtomicU64,
    transport_failures: AtomicU64,
}

impl RelayStats {
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejection(&self, rejection: Rejection) {
        let counter = match rejection {
            Rejection::TamperDetected => &self.tamper_rejected,
            Rejection::ReplayDetected => &self.replay_rejected,
            Rejection::Stale => &self.stale_rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_transport_failure(&self) {
        self.transport_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayCounters {
        RelayCounters {
            received: self.received.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            tamper_rejected: self.tamper_rejected.load(Ordering::Relaxed),
            replay_rejected: self.replay_rejected.load(Ordering::Relaxed),
            stale_rejected: self.stale_rejected.load(Ordering::Relaxed),
            transport_failures: self.transport_failures.load(Ordering::Relaxed),
        }
    }
}

/// Copy of [`RelayStats`] at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayCounters {
    pub received: u64,
    pub forwarded: u64,
    pub tamper_rejected: u64,
    pub replay_rejected: u64,
    pub stale_rejected: u64,
    pub transport_failures: u64,
}

impl RelayCounters {
    pub fn rejected(&self) -> u64 {
        self.tamper_rejected + self.replay_rejected + self.stale_rejected
    }
}

/// Event dispatch counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchCounters {
    /// Accepted into the queue.
    pub dispatched: u64,
    /// Refused because the queue was full or closed.
    pub dropped: u64,
    /// Written by the sink.
    pub persisted: u64,
    /// Sink returned an error.
    pub failed: u64,
}

/// Everything a stats reporter needs in one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelaySnapshot {
    pub relay: RelayCounters,
    pub window: WindowStats,
    pub events: DispatchCounters,
}
