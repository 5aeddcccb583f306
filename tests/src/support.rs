//! # Shared Fixtures
//!
//! A relay service over a recording transport, driven by a manual clock.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use relay_pipeline::{
    EventDispatcher, EventSink, InMemoryEventStore, LegCodecs, ManualTimeSource, RelayPolicy,
    RelayService, RelayTransport, TimeSource,
};
use serde_json::json;
use shared_crypto::{Codec, KeyMaterial};
use shared_types::{Channel, PayloadHeader, Timestamp, TransportError};

pub const DEVICE_SECRET: &[u8] = b"device-leg-secret-0123456789abcd";
pub const CLOUD_SECRET: &[u8] = b"cloud-leg-secret-0123456789abcde";

/// Transport that keeps every publish.
#[derive(Default)]
pub struct RecordingTransport {
    published: Mutex<Vec<(Channel, Vec<u8>)>>,
}

impl RecordingTransport {
    pub fn published(&self) -> Vec<(Channel, Vec<u8>)> {
        self.published.lock().clone()
    }

    pub fn count_on(&self, channel: Channel) -> usize {
        self.published
            .lock()
            .iter()
            .filter(|(c, _)| *c == channel)
            .count()
    }
}

#[async_trait]
impl RelayTransport for RecordingTransport {
    async fn publish(&self, channel: Channel, payload: Vec<u8>) -> Result<(), TransportError> {
        self.published.lock().push((channel, payload));
        Ok(())
    }
}

pub fn codec(secret: &[u8]) -> Codec {
    Codec::new(&KeyMaterial::from_bytes(secret.to_vec()).unwrap()).unwrap()
}

/// Seal a telemetry body stamped with `origin`.
pub fn seal(codec: &Codec, origin: Timestamp, seq: u64) -> Vec<u8> {
    let plaintext = PayloadHeader::stamp(json!({"seq": seq, "alt": 120.5}), origin);
    codec.encrypt_to_wire(&plaintext).unwrap()
}

/// A relay service with recorded side effects.
pub struct Harness {
    pub service: RelayService<RecordingTransport, ManualTimeSource>,
    pub transport: Arc<RecordingTransport>,
    pub store: Arc<InMemoryEventStore>,
    pub clock: Arc<ManualTimeSource>,
    pub device: Codec,
    pub cloud: Codec,
}

impl Harness {
    /// Separate secrets per leg.
    pub fn split(policy: RelayPolicy) -> Self {
        Self::build(
            LegCodecs::split(codec(DEVICE_SECRET), codec(CLOUD_SECRET)),
            policy,
            codec(DEVICE_SECRET),
            codec(CLOUD_SECRET),
        )
    }

    /// One secret on both legs.
    pub fn shared(policy: RelayPolicy) -> Self {
        Self::build(
            LegCodecs::shared(codec(DEVICE_SECRET)),
            policy,
            codec(DEVICE_SECRET),
            codec(DEVICE_SECRET),
        )
    }

    fn build(codecs: LegCodecs, policy: RelayPolicy, device: Codec, cloud: Codec) -> Self {
        let transport = Arc::new(RecordingTransport::default());
        let store = Arc::new(InMemoryEventStore::new());
        let clock = Arc::new(ManualTimeSource::new(1_000_000));
        let sink: Arc<dyn EventSink> = store.clone();
        let events = Arc::new(EventDispatcher::spawn(sink, 4096));
        let service = RelayService::new(codecs, policy, transport.clone(), clock.clone(), events);
        Self {
            service,
            transport,
            store,
            clock,
            device,
            cloud,
        }
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Flush queued detection events into the store.
    pub async fn flush(&self) {
        self.service.events().shutdown().await;
    }
}
