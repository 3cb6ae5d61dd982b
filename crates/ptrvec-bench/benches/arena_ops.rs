//! Criterion micro-benchmarks for native row storage, without the bridge.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use ptrvec_arena::{ArenaConfig, RowStore};
use ptrvec_bench::{ragged_profile, square_profile};

fn make_store(rows: &[Vec<ptrvec_core::OpaquePtr>]) -> RowStore {
    let mut store = RowStore::with_rows(ArenaConfig::default(), rows.len()).unwrap();
    for (i, row) in rows.iter().enumerate() {
        store.write_row(i, row).unwrap();
    }
    store
}

/// Benchmark: grow every row of a 256-row store one slot at a time to 32.
fn bench_grow_rows(c: &mut Criterion) {
    c.bench_function("grow_rows_256x32", |b| {
        b.iter(|| {
            let mut store = RowStore::with_rows(ArenaConfig::default(), 256).unwrap();
            for len in 1..=32 {
                for row in 0..256 {
                    store.resize_row(row, len).unwrap();
                }
            }
            black_box(store.stats());
        });
    });
}

/// Benchmark: truncate and regrow the outer sequence so retired row
/// ranges are handed back out.
fn bench_retire_reuse(c: &mut Criterion) {
    let mut store = make_store(&ragged_profile(1024));
    c.bench_function("retire_reuse_1024", |b| {
        b.iter(|| {
            store.resize(512).unwrap();
            store.resize(1024).unwrap();
            for row in 512..1024 {
                store.resize_row(row, 7).unwrap();
            }
            black_box(store.retired_count());
        });
    });
}

/// Benchmark: compacting assign of a 64x64 store.
fn bench_assign_64(c: &mut Criterion) {
    let src = make_store(&square_profile(64));
    let mut dst = RowStore::new(ArenaConfig::default()).unwrap();
    c.bench_function("store_assign_64x64", |b| {
        b.iter(|| {
            dst.assign_from(&src).unwrap();
            black_box(dst.len());
        });
    });
}

criterion_group!(benches, bench_grow_rows, bench_retire_reuse, bench_assign_64);
criterion_main!(benches);
