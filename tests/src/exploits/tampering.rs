//! # Tampering Attacks
//!
//! ## Attack Vectors
//!
//! - Flip any single bit of the IV, ciphertext or MAC
//! - Splice the ciphertext of one envelope under the MAC of another
//! - Seal with a guessed key
//! - Truncate or extend the ciphertext
//!
//! ## Expected Defense
//!
//! Every variant is rejected as `TamperDetected` before decryption, emits
//! exactly one event, and leaves the replay window untouched.

#[cfg(test)]
mod tests {
    use relay_pipeline::{RelayOutcome, RelayPolicy, Rejection};
    use shared_types::{DetectionKind, Direction, SealedEnvelope};

    use crate::support::{codec, seal, Harness};

    async fn assert_tamper(h: &Harness, raw: &[u8]) {
        let now = h.now();
        let outcome = h
            .service
            .process_at(Direction::DeviceToCloud, raw, now)
            .await
            .unwrap();
        assert_eq!(outcome, RelayOutcome::Rejected(Rejection::TamperDetected));
    }

    #[tokio::test]
    async fn test_every_single_bit_flip_is_rejected() {
        let h = Harness::shared(RelayPolicy::default());
        let original = SealedEnvelope::from_json(&seal(&h.device, h.now(), 1)).unwrap();

        let mut attempts = 0;
        for field in 0..3 {
            let len = match field {
                0 => original.iv.len(),
                1 => original.ciphertext.len(),
                _ => original.mac.len(),
            };
            for byte in 0..len {
                for bit in 0..8 {
                    let mut forged = original.clone();
                    match field {
                        0 => forged.iv[byte] ^= 1 << bit,
                        1 => forged.ciphertext[byte] ^= 1 << bit,
                        _ => forged.mac[byte] ^= 1 << bit,
                    }
                    assert_tamper(&h, &forged.to_json_bytes().unwrap()).await;
                    attempts += 1;
                }
            }
        }
        h.flush().await;

        assert_eq!(h.store.len(), attempts);
        assert_eq!(h.store.count_of(DetectionKind::TamperDetected), attempts);
        assert!(h.service.window().is_empty());
        assert!(h.transport.published().is_empty());
    }

    #[tokio::test]
    async fn test_spliced_envelope_is_rejected() {
        let h = Harness::shared(RelayPolicy::default());
        let now = h.now();
        let a = SealedEnvelope::from_json(&seal(&h.device, now, 1)).unwrap();
        let b = SealedEnvelope::from_json(&seal(&h.device, now, 2)).unwrap();

        let spliced = SealedEnvelope {
            iv: a.iv,
            ciphertext: b.ciphertext.clone(),
            mac: a.mac,
        };
        assert_tamper(&h, &spliced.to_json_bytes().unwrap()).await;
        h.flush().await;

        assert_eq!(h.store.events()[0].detail["reason"], "mac mismatch");
    }

    #[tokio::test]
    async fn test_guessed_key_is_rejected() {
        let h = Harness::shared(RelayPolicy::default());
        let attacker = codec(b"attacker-guess-0123456789abcdef!");

        assert_tamper(&h, &seal(&attacker, h.now(), 1)).await;
        h.flush().await;
        assert_eq!(h.store.count_of(DetectionKind::TamperDetected), 1);
    }

    #[tokio::test]
    async fn test_cloud_key_cannot_speak_for_devices() {
        // With split keys, a compromised cloud-side sender cannot inject on
        // the device leg.
        let h = Harness::split(RelayPolicy::default());

        assert_tamper(&h, &seal(&h.cloud, h.now(), 1)).await;
        h.flush().await;
        assert!(h.transport.published().is_empty());
    }

    #[tokio::test]
    async fn test_truncated_and_extended_ciphertext_is_rejected() {
        let h = Harness::shared(RelayPolicy::default());
        let original = SealedEnvelope::from_json(&seal(&h.device, h.now(), 1)).unwrap();

        let mut truncated = original.clone();
        truncated.ciphertext.truncate(truncated.ciphertext.len() - 16);
        assert_tamper(&h, &truncated.to_json_bytes().unwrap()).await;

        let mut extended = original.clone();
        extended.ciphertext.extend_from_slice(&[0u8; 16]);
        assert_tamper(&h, &extended.to_json_bytes().unwrap()).await;

        let mut empty = original;
        empty.ciphertext.clear();
        assert_tamper(&h, &empty.to_json_bytes().unwrap()).await;

        h.flush().await;
        assert_eq!(h.store.len(), 3);
    }

    #[tokio::test]
    async fn test_garbage_wire_is_rejected() {
        let h = Harness::shared(RelayPolicy::default());
        let inputs: [&[u8]; 5] = [
            b"",
            b"null",
            b"[]",
            b"{\"iv\":\"zz\",\"ciphertext\":\"\",\"mac\":\"\"}",
            b"\xff\xfe\xfd",
        ];
        for raw in inputs {
            assert_tamper(&h, raw).await;
        }
        h.flush().await;

        assert!(h
            .store
            .events()
            .iter()
            .all(|e| e.detail["reason"] == "malformed envelope"));
    }
}
