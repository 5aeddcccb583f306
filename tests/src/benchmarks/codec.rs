//! # Codec Benchmarks
//!
//! Conditions:
//! - Payload sizes from a bare heartbeat to a 16 KiB camera thumbnail
//! - Forged envelopes, which must be rejected at MAC cost only

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use shared_crypto::{Codec, KeyMaterial};
use std::time::Duration;

const SIZES: [usize; 4] = [64, 256, 1024, 16 * 1024];

fn bench_codec() -> Codec {
    let mut secret = vec![0u8; 32];
    rand::thread_rng().fill(&mut secret[..]);
    Codec::new(&KeyMaterial::from_bytes(secret).unwrap()).unwrap()
}

fn payload(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

pub fn seal(c: &mut Criterion) {
    let codec = bench_codec();
    let mut group = c.benchmark_group("codec/seal");
    group.measurement_time(Duration::from_secs(5));

    for size in SIZES {
        let plaintext = payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &plaintext, |b, pt| {
            b.iter(|| black_box(codec.encrypt(black_box(pt)).unwrap()))
        });
    }
    group.finish();
}

pub fn open(c: &mut Criterion) {
    let codec = bench_codec();
    let mut group = c.benchmark_group("codec/open");
    group.measurement_time(Duration::from_secs(5));

    for size in SIZES {
        let envelope = codec.encrypt(&payload(size)).unwrap();
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &envelope, |b, env| {
            b.iter(|| black_box(codec.decrypt(black_box(env)).unwrap()))
        });
    }
    group.finish();
}

pub fn reject_forged(c: &mut Criterion) {
    let codec = bench_codec();
    let mut envelope = codec.encrypt(&payload(1024)).unwrap();
    envelope.mac[0] ^= 0x01;

    c.bench_function("codec/reject_forged_1024", |b| {
        b.iter(|| black_box(codec.decrypt(black_box(&envelope)).is_err()))
    });
}

pub fn wire_round_trip(c: &mut Criterion) {
    let codec = bench_codec();
    let plaintext = payload(256);

    c.bench_function("codec/wire_256", |b| {
        b.iter(|| {
            let wire = codec.encrypt_to_wire(black_box(&plaintext)).unwrap();
            let envelope = Codec::decode_wire(&wire).unwrap();
            black_box(codec.decrypt(&envelope).unwrap())
        })
    });
}
