//! # Replay Attacks
//!
//! ## Attack Vectors
//!
//! - Flood: the same captured envelope fired concurrently on both legs
//! - Delayed replay: resend after the replay horizon has passed
//! - Eviction: push a captured envelope out of the window with fresh
//!   traffic, then resend it
//! - Reflection: feed the relay's own re-sealed output back into the
//!   opposite ingress
//!
//! ## Expected Defense
//!
//! - At most one copy is ever forwarded within the horizon
//! - Forwarded copies are remembered under their new MAC, so a forwarded
//!   message costs two window slots
//! - Past the horizon the latency gate rejects the copy when the ceiling
//!   does not exceed the horizon
//! - Eviction only helps an attacker who can also beat the latency gate

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use relay_pipeline::{RelayOutcome, RelayPolicy, Rejection};
    use shared_types::{Channel, DetectionKind, Direction};

    use crate::support::{seal, Harness};

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_flood_forwards_once() {
        let h = Arc::new(Harness::shared(RelayPolicy::default()));
        let captured = Arc::new(seal(&h.device, h.now(), 42));

        let mut tasks = Vec::new();
        for i in 0..64 {
            let h = Arc::clone(&h);
            let captured = Arc::clone(&captured);
            let direction = if i % 2 == 0 {
                Direction::DeviceToCloud
            } else {
                Direction::CloudToDevice
            };
            tasks.push(tokio::spawn(async move {
                h.service.process(direction, &captured).await.unwrap()
            }));
        }

        let mut forwarded = 0;
        let mut replays = 0;
        for task in tasks {
            match task.await.unwrap() {
                RelayOutcome::Forwarded { .. } => forwarded += 1,
                RelayOutcome::Rejected(Rejection::ReplayDetected) => replays += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }
        h.flush().await;

        assert_eq!(forwarded, 1);
        assert_eq!(replays, 63);
        assert_eq!(h.store.count_of(DetectionKind::ReplayDetected), 63);
        assert_eq!(h.transport.published().len(), 1);
        assert_eq!(h.service.window().len(), 2);
    }

    #[tokio::test]
    async fn test_reflected_output_is_replay_on_both_legs() {
        let h = Harness::split(RelayPolicy::default());
        let origin = h.now();

        let uplink = seal(&h.device, origin, 1);
        let downlink = seal(&h.cloud, origin, 2);
        h.service.process(Direction::DeviceToCloud, &uplink).await.unwrap();
        h.service.process(Direction::CloudToDevice, &downlink).await.unwrap();

        let published = h.transport.published();
        assert_eq!(published.len(), 2);

        h.clock.advance(1_000);
        for (channel, bytes) in published {
            let back_in = match channel {
                Channel::CloudOutbound => Direction::CloudToDevice,
                Channel::DeviceOutbound => Direction::DeviceToCloud,
                other => panic!("unexpected channel {other:?}"),
            };
            let outcome = h.service.process(back_in, &bytes).await.unwrap();
            assert_eq!(outcome, RelayOutcome::Rejected(Rejection::ReplayDetected));
        }
        h.flush().await;

        assert_eq!(h.store.count_of(DetectionKind::ReplayDetected), 2);
        assert_eq!(h.store.len(), 2);
        assert_eq!(h.transport.published().len(), 2);
    }

    #[tokio::test]
    async fn test_delayed_replay_is_stale() {
        let h = Harness::shared(RelayPolicy::default());
        let origin = h.now();
        let captured = seal(&h.device, origin, 1);

        let first = h.service.process(Direction::DeviceToCloud, &captured).await.unwrap();
        assert!(first.is_forwarded());

        // Past the horizon the window no longer matches; the gate does.
        h.clock.advance(5_001);
        let second = h.service.process(Direction::DeviceToCloud, &captured).await.unwrap();
        h.flush().await;

        assert_eq!(second, RelayOutcome::Rejected(Rejection::Stale));
        assert_eq!(h.store.count_of(DetectionKind::StalenessExceeded), 1);
        assert_eq!(h.transport.count_on(Channel::CloudOutbound), 1);
    }

    #[tokio::test]
    async fn test_ceiling_above_horizon_lets_late_replay_through() {
        let policy = RelayPolicy {
            window_size: 100,
            max_delay_ms: 1_000,
            latency_ceiling_ms: 10_000,
        };
        let h = Harness::shared(policy);
        let captured = seal(&h.device, h.now(), 1);

        h.service.process(Direction::DeviceToCloud, &captured).await.unwrap();
        h.clock.advance(500);
        let inside = h.service.process(Direction::DeviceToCloud, &captured).await.unwrap();
        assert_eq!(inside, RelayOutcome::Rejected(Rejection::ReplayDetected));

        h.clock.advance(1_000);
        let outside = h.service.process(Direction::DeviceToCloud, &captured).await.unwrap();
        h.flush().await;

        assert!(outside.is_forwarded());
        assert_eq!(h.transport.count_on(Channel::CloudOutbound), 2);
    }

    #[tokio::test]
    async fn test_eviction_by_fresh_traffic() {
        let policy = RelayPolicy {
            window_size: 6,
            ..RelayPolicy::default()
        };
        let h = Harness::shared(policy);
        let now = h.now();
        let captured = seal(&h.device, now, 0);

        h.service.process(Direction::DeviceToCloud, &captured).await.unwrap();
        for seq in 1..=3 {
            let fresh = seal(&h.device, now, seq);
            h.service.process(Direction::DeviceToCloud, &fresh).await.unwrap();
        }
        // Four forwards, two slots each.
        assert_eq!(h.service.window().len(), 6);
        assert_eq!(h.service.window().stats().evicted, 2);

        // The window has forgotten it and the copy is still on time.
        let replayed = h.service.process(Direction::DeviceToCloud, &captured).await.unwrap();
        h.flush().await;

        assert!(replayed.is_forwarded());
        assert_eq!(h.service.window().len(), 6);
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_replay_does_not_refresh_entry() {
        let policy = RelayPolicy {
            window_size: 4,
            ..RelayPolicy::default()
        };
        let h = Harness::shared(policy);
        let now = h.now();
        let a = seal(&h.device, now, 1);
        let b = seal(&h.device, now, 2);
        let c = seal(&h.device, now, 3);

        h.service.process(Direction::DeviceToCloud, &a).await.unwrap();
        h.service.process(Direction::DeviceToCloud, &b).await.unwrap();
        // Replay of `a` leaves the order untouched.
        h.service.process(Direction::DeviceToCloud, &a).await.unwrap();
        // `c` and its forwarded copy evict both slots held by `a`.
        h.service.process(Direction::DeviceToCloud, &c).await.unwrap();

        let b_again = h.service.process(Direction::DeviceToCloud, &b).await.unwrap();
        let again = h.service.process(Direction::DeviceToCloud, &a).await.unwrap();
        h.flush().await;

        assert_eq!(b_again, RelayOutcome::Rejected(Rejection::ReplayDetected));
        assert!(again.is_forwarded());
    }
}
