//! # Replay Window
//!
//! Fixed-capacity FIFO history of admitted message fingerprints, shared by
//! both relay directions.
//!
//! ## Matching Rule
//!
//! A candidate is a replay iff some retained entry `e` satisfies
//!
//! ```text
//! now - e.origin_timestamp <= max_delay   AND   e.mac == candidate.mac
//! ```
//!
//! Entries past `max_delay` stay in the deque until evicted by capacity but
//! never match. The whole scan-then-append runs under one lock, so two
//! concurrent admits of the same MAC cannot both observe `Fresh`.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{MacTag, Timestamp};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of an admitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub mac: MacTag,
    pub origin_timestamp: Timestamp,
}

impl Fingerprint {
    pub fn new(mac: MacTag, origin_timestamp: Timestamp) -> Self {
        Self {
            mac,
            origin_timestamp,
        }
    }
}

/// Result of [`ReplayWindow::admit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmitOutcome {
    /// Not seen within the horizon; now recorded.
    Fresh,
    /// Matched a live entry; window unchanged.
    Replay,
}

/// Point-in-time counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    pub len: usize,
    pub capacity: usize,
    pub admitted: u64,
    pub replays_detected: u64,
    pub evicted: u64,
}

/// Bounded replay history.
#[derive(Debug)]
pub struct ReplayWindow {
    entries: Mutex<VecDeque<Fingerprint>>,
    capacity: usize,
    max_delay_ms: u64,
    admitted: AtomicU64,
    replays_detected: AtomicU64,
    evicted: AtomicU64,
}

impl ReplayWindow {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize, max_delay_ms: u64) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            max_delay_ms,
            admitted: AtomicU64::new(0),
            replays_detected: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
        }
    }

    /// Check `fingerprint` against the live entries and record it if fresh.
    pub fn admit(&self, fingerprint: Fingerprint, now: Timestamp) -> AdmitOutcome {
        let mut entries = self.entries.lock();

        let replay = entries.iter().any(|e| {
            now.saturating_sub(e.origin_timestamp) <= self.max_delay_ms && e.mac == fingerprint.mac
        });
        if replay {
            self.replays_detected.fetch_add(1, Ordering::Relaxed);
            return AdmitOutcome::Replay;
        }

        if entries.len() >= self.capacity {
            entries.pop_front();
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        entries.push_back(fingerprint);
        self.admitted.fetch_add(1, Ordering::Relaxed);
        AdmitOutcome::Fresh
    }

    /// Whether any retained entry (live or expired) carries `mac`.
    pub fn contains_mac(&self, mac: &MacTag) -> bool {
        self.entries.lock().iter().any(|e| &e.mac == mac)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }

    pub fn stats(&self) -> WindowStats {
        WindowStats {
            len: self.len(),
            capacity: self.capacity,
            admitted: self.admitted.load(Ordering::Relaxed),
            replays_detected: self.replays_detected.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
        }
    }
}
