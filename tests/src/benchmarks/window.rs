//! # Replay Window Benchmarks
//!
//! Conditions:
//! - Full window at the default capacity and at 10x that
//! - All-replay traffic (worst case: scan hits late)
//! - Contention from several threads on one window

use criterion::{black_box, BenchmarkId, Criterion};
use relay_pipeline::{Fingerprint, ReplayWindow};
use std::sync::Arc;

fn fingerprint(n: u64) -> Fingerprint {
    let mut mac = [0u8; 32];
    mac[..8].copy_from_slice(&n.to_le_bytes());
    Fingerprint::new(mac, 0)
}

fn full_window(capacity: usize) -> ReplayWindow {
    let window = ReplayWindow::new(capacity, u64::MAX);
    for n in 0..capacity as u64 {
        window.admit(fingerprint(n), 0);
    }
    window
}

pub fn admit_fresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("window/admit_fresh");
    for capacity in [100usize, 1000] {
        let window = full_window(capacity);
        let mut next = capacity as u64;
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &capacity, |b, _| {
            b.iter(|| {
                next += 1;
                black_box(window.admit(fingerprint(next), 0))
            })
        });
    }
    group.finish();
}

pub fn admit_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("window/admit_replay");
    for capacity in [100usize, 1000] {
        let window = full_window(capacity);
        // Newest entry: found at the end of the scan.
        let newest = fingerprint(capacity as u64 - 1);
        group.bench_with_input(BenchmarkId::from_parameter(capacity), &newest, |b, fp| {
            b.iter(|| black_box(window.admit(*fp, 0)))
        });
    }
    group.finish();
}

pub fn contended(c: &mut Criterion) {
    let window = Arc::new(full_window(100));

    c.bench_function("window/contended_4_threads", |b| {
        b.iter(|| {
            let handles: Vec<_> = (0..4u64)
                .map(|t| {
                    let window = Arc::clone(&window);
                    std::thread::spawn(move || {
                        for n in 0..256u64 {
                            window.admit(fingerprint(1_000_000 + t * 1_000 + n), 0);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        })
    });
}
