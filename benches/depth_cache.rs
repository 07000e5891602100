//! Benchmarks for depth cache operations.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use binance_depth_cache::depth::{view, DepthCache, PriceLevelMap};
use binance_depth_cache::types::{DeltaEvent, PriceLevel, Snapshot};
use rust_decimal::Decimal;

fn price(i: usize) -> Decimal {
    // 0.01 tick
    Decimal::new(5_000 + i as i64, 2)
}

fn populated_cache(size: usize) -> DepthCache {
    let bids = (0..size)
        .map(|i| PriceLevel::new(price(i), Decimal::ONE))
        .collect();
    let asks = (0..size)
        .map(|i| PriceLevel::new(price(size + i), Decimal::ONE))
        .collect();

    let cache = DepthCache::new("BENCH");
    cache
        .bootstrap(Snapshot::new(0, bids, asks))
        .expect("bootstrap");
    cache
}

fn bench_level_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_upsert");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut side = PriceLevelMap::new();

            // Pre-populate with some levels
            for i in 0..size {
                side.upsert(price(i), Decimal::ONE);
            }

            let mid = price(size / 2);
            b.iter(|| {
                side.upsert(black_box(mid), black_box(Decimal::TEN));
            });
        });
    }

    group.finish();
}

fn bench_cache_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_apply");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let cache = populated_cache(size);
            let mut id = 0u64;

            b.iter(|| {
                // Simulate a typical delta: one bid and one ask change
                id += 1;
                let delta = DeltaEvent::new(
                    id,
                    id,
                    vec![PriceLevel::new(price(size / 2), Decimal::from(id % 7 + 1))],
                    vec![PriceLevel::new(price(size + size / 2), Decimal::from(id % 5 + 1))],
                );
                black_box(cache.apply(black_box(delta)).expect("apply"));
            });
        });
    }

    group.finish();
}

fn bench_cache_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_reads");
    let cache = populated_cache(1000);

    group.bench_function("best_bid_ask", |b| {
        b.iter(|| black_box(cache.best_bid_ask()));
    });

    group.bench_function("snapshot", |b| {
        b.iter(|| black_box(cache.snapshot()));
    });

    group.bench_function("depth_20", |b| {
        b.iter(|| black_box(cache.depth(black_box(20))));
    });

    let snapshot = cache.snapshot();
    group.bench_function("imbalance_10", |b| {
        b.iter(|| black_box(view::imbalance(&snapshot, black_box(10))));
    });

    group.finish();
}

criterion_group!(benches, bench_level_upsert, bench_cache_apply, bench_cache_reads);
criterion_main!(benches);
