//! # Relay Flows
//!
//! ## Flows Tested:
//!
//! 1. **Device → Cloud**: telemetry sealed for the device leg arrives on
//!    `cloud-outbound` sealed for the cloud leg
//! 2. **Cloud → Device**: commands take the reverse path
//! 3. **Cross-leg replay**: an envelope captured on one leg and injected on
//!    the other is caught by the shared window
//! 4. **Mixed traffic**: both legs at once, every message accounted for

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    use relay_pipeline::RelayApi;
    use relay_runtime::container::RelayConfig;
    use relay_runtime::RelayRuntime;
    use shared_bus::{BusPublisher, EventFilter, InMemoryBus, Subscription};
    use shared_crypto::{Codec, KeyMaterial};
    use shared_types::{current_timestamp_ms, Channel, DetectionKind, PayloadHeader};

    use crate::support::{codec, seal, CLOUD_SECRET, DEVICE_SECRET};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn shared_key_config() -> RelayConfig {
        let mut config =
            RelayConfig::new(KeyMaterial::from_bytes(DEVICE_SECRET.to_vec()).unwrap());
        config.stats_interval_secs = 0;
        config
    }

    fn split_key_config() -> RelayConfig {
        let mut config = shared_key_config();
        config.security.cloud_secret =
            Some(KeyMaterial::from_bytes(CLOUD_SECRET.to_vec()).unwrap());
        config
    }

    async fn start(config: RelayConfig) -> (RelayRuntime, Arc<InMemoryBus>) {
        let bus = Arc::new(InMemoryBus::new());
        let runtime = RelayRuntime::with_bus(config, Arc::clone(&bus)).await.unwrap();
        runtime.start().await.unwrap();
        (runtime, bus)
    }

    async fn wait_for_received(runtime: &RelayRuntime, expected: u64) {
        let container = runtime.container();
        for _ in 0..200 {
            if container.relay.snapshot().relay.received >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn open_next(subscription: &mut Subscription, codec: &Codec) -> u64 {
        let message = timeout(Duration::from_secs(1), subscription.recv())
            .await
            .expect("Should receive within timeout")
            .expect("Should have message");
        let envelope = Codec::decode_wire(&message.payload).unwrap();
        let plaintext = codec.decrypt(&envelope).unwrap();
        let body: serde_json::Value = serde_json::from_slice(&plaintext).unwrap();
        body["seq"].as_u64().unwrap()
    }

    // =============================================================================
    // FLOWS
    // =============================================================================

    #[tokio::test]
    async fn test_split_keys_device_to_cloud() {
        let (runtime, bus) = start(split_key_config()).await;
        let mut cloud_rx = bus.subscribe(EventFilter::channel(Channel::CloudOutbound));

        let device = codec(DEVICE_SECRET);
        bus.publish(Channel::DeviceInbound, seal(&device, current_timestamp_ms(), 1))
            .await;

        // Opens with the cloud key only.
        assert_eq!(open_next(&mut cloud_rx, &codec(CLOUD_SECRET)).await, 1);

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_split_keys_cloud_to_device() {
        let (runtime, bus) = start(split_key_config()).await;
        let mut device_rx = bus.subscribe(EventFilter::channel(Channel::DeviceOutbound));

        let cloud = codec(CLOUD_SECRET);
        bus.publish(Channel::CloudInbound, seal(&cloud, current_timestamp_ms(), 2))
            .await;

        assert_eq!(open_next(&mut device_rx, &codec(DEVICE_SECRET)).await, 2);

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn test_cross_leg_replay_is_detected() {
        let (runtime, bus) = start(shared_key_config()).await;
        let mut cloud_rx = bus.subscribe(EventFilter::channel(Channel::CloudOutbound));
        let mut device_rx = bus.subscribe(EventFilter::channel(Channel::DeviceOutbound));

        let shared = codec(DEVICE_SECRET);
        let captured = seal(&shared, current_timestamp_ms(), 3);
        bus.publish(Channel::DeviceInbound, captured.clone()).await;
        assert_eq!(open_next(&mut cloud_rx, &shared).await, 3);

        // Attacker injects the same envelope on the cloud leg.
        bus.publish(Channel::CloudInbound, captured).await;
        wait_for_received(&runtime, 2).await;
        assert!(
            timeout(Duration::from_millis(100), device_rx.recv()).await.is_err(),
            "cross-leg replay must not reach devices"
        );

        runtime.shutdown().await;
        let store = runtime.container().memory_store.clone().unwrap();
        let events = store.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, DetectionKind::ReplayDetected);
        assert_eq!(events[0].direction(), Some("cloud-to-device"));
    }

    #[tokio::test]
    async fn test_mixed_traffic_is_fully_accounted() {
        let (runtime, bus) = start(shared_key_config()).await;
        let _cloud_rx = bus.subscribe(EventFilter::channel(Channel::CloudOutbound));
        let _device_rx = bus.subscribe(EventFilter::channel(Channel::DeviceOutbound));

        let shared = codec(DEVICE_SECRET);
        let now = current_timestamp_ms();
        let mut sent = 0u64;
        for seq in 0..20 {
            bus.publish(Channel::DeviceInbound, seal(&shared, now, seq)).await;
            bus.publish(Channel::CloudInbound, seal(&shared, now, 100 + seq))
                .await;
            sent += 2;
        }
        // Tampered and stale traffic mixed in.
        bus.publish(Channel::DeviceInbound, b"{\"iv\":\"00\"}".to_vec()).await;
        bus.publish(Channel::CloudInbound, seal(&shared, now - 30_000, 999))
            .await;
        sent += 2;

        wait_for_received(&runtime, sent).await;
        runtime.shutdown().await;

        let snapshot = runtime.container().relay.snapshot();
        assert_eq!(snapshot.relay.received, sent);
        assert_eq!(snapshot.relay.forwarded, 40);
        assert_eq!(snapshot.relay.tamper_rejected, 1);
        assert_eq!(snapshot.relay.stale_rejected, 1);
        assert_eq!(snapshot.relay.forwarded + snapshot.relay.rejected(), sent);
        assert_eq!(snapshot.events.persisted, 2);
    }
}
