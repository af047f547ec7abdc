//! Criterion benchmarks for the monthly ranking pipeline.
//!
//! Benchmarks:
//! 1. Momentum scoring over month-end closes
//! 2. Trend filter (SMA over daily closes)
//! 3. Full reconcile (truncate, score, filter, select, append) on a memory store

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::NaiveDate;
use gaalab_core::data::SyntheticProvider;
use gaalab_core::domain::{MonthKey, PriceSeries, PriceTable};
use gaalab_core::indicators::{MomentumScorer, Sma};
use gaalab_core::signal::trend_filter;
use gaalab_core::state::MemoryStateStore;
use gaalab_core::{Engine, EngineConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_table(instruments: usize) -> PriceTable {
    let provider = SyntheticProvider::default();
    let start = NaiveDate::from_ymd_opt(2022, 7, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
    let mut table = PriceTable::new();
    for i in 0..instruments {
        let symbol = format!("SYN{i:03}");
        let points = provider.generate(&symbol, start, end);
        table.insert(symbol, PriceSeries::new(points));
    }
    table
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_scoring(c: &mut Criterion) {
    let mut group = c.benchmark_group("momentum_score");
    let eval = MonthKey::new(2024, 6).unwrap();
    let scorer = MomentumScorer::default();
    for instruments in [7usize, 50, 250] {
        let table = make_table(instruments);
        group.bench_with_input(
            BenchmarkId::new("default_horizons", instruments),
            &instruments,
            |b, _| b.iter(|| scorer.score(black_box(&table), eval)),
        );
    }
    group.finish();
}

fn bench_trend_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("trend_filter");
    let sma = Sma::new(150).unwrap();
    for instruments in [7usize, 50, 250] {
        let table = make_table(instruments);
        group.bench_with_input(
            BenchmarkId::new("sma_150", instruments),
            &instruments,
            |b, _| b.iter(|| trend_filter(black_box(&table), sma)),
        );
    }
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let engine = Engine::new(EngineConfig::default()).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 7, 2).unwrap();
    for instruments in [7usize, 50, 250] {
        let table = make_table(instruments);
        group.bench_with_input(
            BenchmarkId::new("fresh_store", instruments),
            &instruments,
            |b, _| {
                b.iter(|| {
                    let mut store = MemoryStateStore::new();
                    engine
                        .reconcile(black_box(&table), today, &mut store)
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_scoring, bench_trend_filter, bench_reconcile);
criterion_main!(benches);
