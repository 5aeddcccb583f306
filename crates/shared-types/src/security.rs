//! # Detection Events
//!
//! Security events emitted by the relay when a message violates policy.
//! An event is terminal: once handed to the event sink nothing reads it back
//! on the relay path.
//!
//! ## Persisted Shape
//!
//! ```json
//! {"kind": "ReplayDetected", "detail": {"direction": "...", ...}, "timestamp": 1700000000000}
//! ```

use crate::entities::{Direction, Timestamp};
use crate::envelope::MacTag;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which policy a message violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetectionKind {
    /// MAC already admitted within the replay horizon.
    ReplayDetected,
    /// MAC mismatch or undecodable message.
    TamperDetected,
    /// Origin timestamp older than the latency ceiling.
    StalenessExceeded,
}

impl DetectionKind {
    /// Name as persisted and used for metric labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReplayDetected => "ReplayDetected",
            Self::TamperDetected => "TamperDetected",
            Self::StalenessExceeded => "StalenessExceeded",
        }
    }
}

impl fmt::Display for DetectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded policy violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    pub kind: DetectionKind,
    /// Free-form JSON object; always carries `direction`.
    pub detail: Value,
    /// Epoch milliseconds at which the relay observed the violation.
    pub timestamp: Timestamp,
}

impl DetectionEvent {
    pub fn new(kind: DetectionKind, detail: Value, timestamp: Timestamp) -> Self {
        Self {
            kind,
            detail,
            timestamp,
        }
    }

    /// A MAC seen again inside the replay horizon.
    pub fn replay(
        direction: Direction,
        mac: &MacTag,
        origin_timestamp: Timestamp,
        observed_at: Timestamp,
    ) -> Self {
        Self::new(
            DetectionKind::ReplayDetected,
            json!({
                "direction": direction.label(),
                "mac": hex::encode(mac),
                "originTimestamp": origin_timestamp,
            }),
            observed_at,
        )
    }

    /// A message that failed authentication or decoding.
    ///
    /// `mac` is absent when the envelope itself could not be parsed.
    pub fn tamper(
        direction: Direction,
        reason: &str,
        mac: Option<&MacTag>,
        observed_at: Timestamp,
    ) -> Self {
        let mut detail = json!({
            "direction": direction.label(),
            "reason": reason,
        });
        if let (Some(mac), Some(map)) = (mac, detail.as_object_mut()) {
            map.insert("mac".into(), Value::String(hex::encode(mac)));
        }
        Self::new(DetectionKind::TamperDetected, detail, observed_at)
    }

    /// A message older than the latency ceiling.
    pub fn stale(
        direction: Direction,
        mac: &MacTag,
        origin_timestamp: Timestamp,
        age_ms: u64,
        ceiling_ms: u64,
        observed_at: Timestamp,
    ) -> Self {
        Self::new(
            DetectionKind::StalenessExceeded,
            json!({
                "direction": direction.label(),
                "mac": hex::encode(mac),
                "originTimestamp": origin_timestamp,
                "ageMs": age_ms,
                "ceilingMs": ceiling_ms,
            }),
            observed_at,
        )
    }

    /// The `direction` label from `detail`, if present.
    #[must_use]
    pub fn direction(&self) -> Option<&str> {
        self.detail.get("direction").and_then(Value::as_str)
    }
}

/// Current wall-clock time in epoch milliseconds.
///
/// A clock set before the epoch reads as 0.
#[must_use]
pub fn current_timestamp_ms() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}
