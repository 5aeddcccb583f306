//! # UAV Relay Benchmarks
//!
//! ```bash
//! cargo bench -p relay-tests
//! cargo bench -p relay-tests -- codec/
//! cargo bench -p relay-tests -- window/
//! ```

use criterion::{criterion_group, criterion_main};
use relay_tests::benchmarks::{codec, window};

criterion_group!(
    codec_benches,
    codec::seal,
    codec::open,
    codec::reject_forged,
    codec::wire_round_trip
);
criterion_group!(
    window_benches,
    window::admit_fresh,
    window::admit_replay,
    window::contended
);
criterion_main!(codec_benches, window_benches);
