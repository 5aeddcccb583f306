//! # Latency Gate
//!
//! Bounds how old a forwarded message may be, measured against the
//! sender-embedded origin timestamp.

use shared_types::Timestamp;

/// Verdict of the latency gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyOutcome {
    OnTime,
    Stale,
}

/// Age of a message at `now`. Origins in the future have age 0.
pub fn age(origin_timestamp: Timestamp, now: Timestamp) -> u64 {
    now.saturating_sub(origin_timestamp)
}

/// `Stale` iff `now - origin_timestamp > ceiling_ms`.
pub fn check(origin_timestamp: Timestamp, now: Timestamp, ceiling_ms: u64) -> LatencyOutcome {
    if age(origin_timestamp, now) > ceiling_ms {
        LatencyOutcome::Stale
    } else {
        LatencyOutcome::OnTime
    }
}

/// A latency ceiling bound at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyGate {
    ceiling_ms: u64,
}

impl LatencyGate {
    pub fn new(ceiling_ms: u64) -> Self {
        Self { ceiling_ms }
    }

    pub fn ceiling_ms(&self) -> u64 {
        self.ceiling_ms
    }

    pub fn check(&self, origin_timestamp: Timestamp, now: Timestamp) -> LatencyOutcome {
        check(origin_timestamp, now, self.ceiling_ms)
    }

    pub fn age(origin_timestamp: Timestamp, now: Timestamp) -> u64 {
        age(origin_timestamp, now)
    }
}
