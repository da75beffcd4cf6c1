//! Criterion benchmarks for TickLab hot paths.
//!
//! Benchmarks:
//! 1. Replay (Bollinger strategy over a whole series)
//! 2. Point-in-time queries (net PnL at every tick)
//! 3. Moving statistics (trailing mean and deviation at every tick)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use ticklab_core::{Backtest, Bar, BollingerStrategy, PercentOfNotional, PriceSeries};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> PriceSeries {
    let base_date = chrono::NaiveDate::from_ymd_opt(2004, 8, 19).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.05;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
                adj_close: close,
            }
        })
        .collect();
    PriceSeries::from_bars("BENCH", bars).unwrap()
}

// ── 1. Replay ────────────────────────────────────────────────────────

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    for n in [252, 1260, 2520] {
        let series = make_series(n);
        group.bench_with_input(BenchmarkId::new("bollinger_30_1", n), &series, |b, series| {
            b.iter(|| {
                let mut bt = Backtest::new(series).unwrap();
                bt.run(&mut BollingerStrategy::new(30, 1.0)).unwrap();
                black_box(bt.trades().len())
            });
        });
    }

    group.finish();
}

// ── 2. Point-in-time Queries ─────────────────────────────────────────

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("queries");
    let series = make_series(1260);
    let mut bt = Backtest::new(&series)
        .unwrap()
        .with_cost(PercentOfNotional::new(0.5));
    bt.run(&mut BollingerStrategy::new(10, 1.0)).unwrap();

    group.bench_function("net_pnl_every_tick_1260", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for i in 0..series.len() {
                acc += bt.net_pnl_at(black_box(i)).unwrap();
            }
            black_box(acc)
        });
    });

    group.bench_function("net_pnl_last_tick", |b| {
        b.iter(|| black_box(bt.net_pnl().unwrap()));
    });

    group.finish();
}

// ── 3. Moving Statistics ─────────────────────────────────────────────

fn bench_moving_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("moving_statistics");
    let series = make_series(2520);

    for period in [10, 30, 200] {
        group.bench_with_input(BenchmarkId::new("ma_std", period), &period, |b, &period| {
            b.iter(|| {
                let mut acc = 0.0;
                for tick in series.ticks() {
                    let sd = tick.moving_std_dev(period);
                    if !sd.is_nan() {
                        acc += tick.moving_average(period) + sd;
                    }
                }
                black_box(acc)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_replay, bench_queries, bench_moving_statistics);
criterion_main!(benches);
