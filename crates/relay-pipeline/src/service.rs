//! # Relay Service
//!
//! Application service that implements the `RelayApi` inbound port.
//!
//! ## Flow
//!
//! ```text
//! RECEIVED ──parse+verify+decrypt──▶ AUTHENTICATED ──window──▶ REPLAY_CHECKED
//!     │                                   │                        │
//!     └─▶ REJECTED(TamperDetected)        └─▶ REJECTED(Replay)     ├─▶ REJECTED(Stale)
//!                                                                  ▼
//!                                          LATENCY_CHECKED ──re-encrypt+publish──▶ FORWARDED
//! ```
//!
//! Each rejection hands exactly one detection event to the dispatcher and
//! drops the message. There are no retries.
//!
//! A forwarded message occupies two window slots: the inbound MAC and the
//! MAC of the re-sealed copy, admitted before publishing.

use crate::adapters::EventDispatcher;
use crate::domain::{
    AdmitOutcome, Fingerprint, LatencyGate, LatencyOutcome, RelayError, RelayOutcome,
    RelayPolicy, RelaySnapshot, RelayStats, Rejection, ReplayWindow, TamperReason,
};
use crate::ports::{RelayApi, RelayTransport, SystemTimeSource, TimeSource};
use async_trait::async_trait;
use shared_crypto::{Codec, CryptoError};
use shared_types::{DetectionEvent, Direction, MacTag, PayloadHeader, Timestamp};
use std::sync::Arc;
use tracing::{debug, warn};

/// Codecs for the two legs of the relay.
///
/// Device-side traffic is opened with the device codec and sealed with the
/// cloud codec, and the reverse for cloud-side traffic.
#[derive(Debug, Clone)]
pub struct LegCodecs {
    device: Arc<Codec>,
    cloud: Arc<Codec>,
}

impl LegCodecs {
    /// Both legs use one secret.
    pub fn shared(codec: Codec) -> Self {
        let codec = Arc::new(codec);
        Self {
            device: codec.clone(),
            cloud: codec,
        }
    }

    /// Each leg has its own secret.
    pub fn split(device: Codec, cloud: Codec) -> Self {
        Self {
            device: Arc::new(device),
            cloud: Arc::new(cloud),
        }
    }

    /// Codec that opens traffic arriving for `direction`.
    pub fn opening(&self, direction: Direction) -> &Codec {
        match direction {
            Direction::DeviceToCloud => &self.device,
            Direction::CloudToDevice => &self.cloud,
        }
    }

    /// Codec that seals traffic leaving for `direction`.
    pub fn sealing(&self, direction: Direction) -> &Codec {
        self.opening(direction.opposite())
    }
}

/// The relay pipeline.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct RelayService<T: RelayTransport, C: TimeSource = SystemTimeSource> {
    codecs: LegCodecs,
    window: Arc<ReplayWindow>,
    gate: LatencyGate,
    transport: Arc<T>,
    clock: Arc<C>,
    events: Arc<EventDispatcher>,
    stats: RelayStats,
}

impl<T: RelayTransport, C: TimeSource> RelayService<T, C> {
    /// Build a service with its own replay window sized from `policy`.
    pub fn new(
        codecs: LegCodecs,
        policy: RelayPolicy,
        transport: Arc<T>,
        clock: Arc<C>,
        events: Arc<EventDispatcher>,
    ) -> Self {
        let window = Arc::new(ReplayWindow::new(policy.window_size, policy.max_delay_ms));
        Self::with_window(codecs, window, policy.latency_ceiling_ms, transport, clock, events)
    }

    /// Build a service around an existing window.
    pub fn with_window(
        codecs: LegCodecs,
        window: Arc<ReplayWindow>,
        latency_ceiling_ms: u64,
        transport: Arc<T>,
        clock: Arc<C>,
        events: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            codecs,
            window,
            gate: LatencyGate::new(latency_ceiling_ms),
            transport,
            clock,
            events,
            stats: RelayStats::default(),
        }
    }

    pub fn window(&self) -> &Arc<ReplayWindow> {
        &self.window
    }

    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// Process `raw` using the injected clock.
    pub async fn process(
        &self,
        direction: Direction,
        raw: &[u8],
    ) -> Result<RelayOutcome, RelayError> {
        self.process_at(direction, raw, self.clock.now()).await
    }

    /// Process `raw` as if the current time were `now`.
    pub async fn process_at(
        &self,
        direction: Direction,
        raw: &[u8],
        now: Timestamp,
    ) -> Result<RelayOutcome, RelayError> {
        self.stats.record_received();

        // RECEIVED -> AUTHENTICATED
        let envelope = match Codec::decode_wire(raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                return Ok(self.reject_tamper(direction, TamperReason::MalformedEnvelope, None, now, &e))
            }
        };
        let plaintext = match self.codecs.opening(direction).decrypt(&envelope) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                let reason = match e {
                    CryptoError::TamperDetected => TamperReason::MacMismatch,
                    _ => TamperReason::MalformedCiphertext,
                };
                return Ok(self.reject_tamper(direction, reason, Some(&envelope.mac), now, &e));
            }
        };
        let header = match PayloadHeader::parse(&plaintext) {
            Ok(header) => header,
            Err(e) => {
                return Ok(self.reject_tamper(
                    direction,
                    TamperReason::MalformedPayload,
                    Some(&envelope.mac),
                    now,
                    &e,
                ))
            }
        };
        let origin = header.origin_timestamp;

        // AUTHENTICATED -> REPLAY_CHECKED
        let fingerprint = Fingerprint::new(envelope.mac, origin);
        if self.window.admit(fingerprint, now) == AdmitOutcome::Replay {
            warn!(
                direction = %direction,
                mac = %envelope.mac_hex(),
                origin_ts = origin,
                "Replay detected"
            );
            self.stats.record_rejection(Rejection::ReplayDetected);
            self.events
                .dispatch(DetectionEvent::replay(direction, &envelope.mac, origin, now));
            return Ok(RelayOutcome::Rejected(Rejection::ReplayDetected));
        }

        // REPLAY_CHECKED -> LATENCY_CHECKED
        let age_ms = LatencyGate::age(origin, now);
        if self.gate.check(origin, now) == LatencyOutcome::Stale {
            warn!(
                direction = %direction,
                mac = %envelope.mac_hex(),
                origin_ts = origin,
                age_ms,
                ceiling_ms = self.gate.ceiling_ms(),
                "Stale message dropped"
            );
            self.stats.record_rejection(Rejection::Stale);
            self.events.dispatch(DetectionEvent::stale(
                direction,
                &envelope.mac,
                origin,
                age_ms,
                self.gate.ceiling_ms(),
                now,
            ));
            return Ok(RelayOutcome::Rejected(Rejection::Stale));
        }

        // LATENCY_CHECKED -> FORWARDED
        let destination = direction.egress();
        let outbound = self.codecs.sealing(direction).encrypt(&plaintext)?;
        let wire = outbound
            .to_json_bytes()
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        // The re-sealed copy carries a new MAC; remember it too so the
        // published bytes cannot be reflected into either ingress.
        let _ = self.window.admit(Fingerprint::new(outbound.mac, origin), now);
        if let Err(e) = self.transport.publish(destination, wire).await {
            self.stats.record_transport_failure();
            warn!(
                direction = %direction,
                channel = %destination,
                error = %e,
                "Failed to publish forwarded message"
            );
            return Err(e.into());
        }

        self.stats.record_forwarded();
        debug!(
            direction = %direction,
            channel = %destination,
            origin_ts = origin,
            age_ms,
            "Message forwarded"
        );
        Ok(RelayOutcome::Forwarded {
            destination,
            origin_timestamp: origin,
            age_ms,
        })
    }

    fn reject_tamper(
        &self,
        direction: Direction,
        reason: TamperReason,
        mac: Option<&MacTag>,
        now: Timestamp,
        cause: &dyn std::fmt::Display,
    ) -> RelayOutcome {
        warn!(
            direction = %direction,
            reason = reason.as_str(),
            error = %cause,
            "Tamper detected"
        );
        self.stats.record_rejection(Rejection::TamperDetected);
        self.events
            .dispatch(DetectionEvent::tamper(direction, reason.as_str(), mac, now));
        RelayOutcome::Rejected(Rejection::TamperDetected)
    }
}

#[async_trait]
impl<T: RelayTransport, C: TimeSource> RelayApi for RelayService<T, C> {
    async fn relay(&self, direction: Direction, raw: &[u8]) -> Result<RelayOutcome, RelayError> {
        self.process(direction, raw).await
    }

    fn snapshot(&self) -> RelaySnapshot {
        RelaySnapshot {
            relay: self.stats.snapshot(),
            window: self.window.stats(),
            events: self.events.counters(),
        }
    }
}
