//! Criterion benchmarks for the analysis hot paths.
//!
//! Benchmarks:
//! 1. Indicator computation (Bollinger + volume average) across series lengths
//! 2. Signal filtering with each band mode
//! 3. Forward-return evaluation over the default horizons

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bandscan_core::domain::{PriceBar, PriceSeries};
use bandscan_core::evaluation::{evaluate_forward_returns, DEFAULT_HORIZONS};
use bandscan_core::indicators::{compute_indicators, IndicatorParams};
use bandscan_core::signals::{filter_signals, signal_dates, BandMode, SignalCriteria};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(n: usize) -> PriceSeries {
    let base_date = chrono::NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let volume = if i % 37 == 0 { 9_000.0 } else { 2_000.0 + (i % 500) as f64 };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume,
            }
        })
        .collect();
    PriceSeries::new("BENCH.TW", bars).unwrap()
}

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_indicators");
    let params = IndicatorParams::default();

    for n in [252, 1260, 5040] {
        let series = make_series(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, series| {
            b.iter(|| compute_indicators(black_box(series), black_box(&params)))
        });
    }

    group.finish();
}

// ── 2. Filter ────────────────────────────────────────────────────────

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_signals");
    let series = make_series(1260);
    let indicators = compute_indicators(&series, &IndicatorParams::default());

    for mode in [BandMode::None, BandMode::NearUpper, BandMode::NearLower] {
        let criteria = SignalCriteria::volume_only(1.5).with_band(mode, 2.0);
        group.bench_function(mode.as_str(), |b| {
            b.iter(|| filter_signals(black_box(&series), black_box(&indicators), &criteria))
        });
    }

    group.finish();
}

// ── 3. Evaluation ────────────────────────────────────────────────────

fn bench_evaluation(c: &mut Criterion) {
    let series = make_series(1260);
    let indicators = compute_indicators(&series, &IndicatorParams::default());
    let signals = filter_signals(&series, &indicators, &SignalCriteria::default()).unwrap();
    let dates = signal_dates(&signals);

    c.bench_function("evaluate_forward_returns_1260", |b| {
        b.iter(|| evaluate_forward_returns(black_box(&series), black_box(&dates), &DEFAULT_HORIZONS))
    });
}

criterion_group!(benches, bench_indicators, bench_filter, bench_evaluation);
criterion_main!(benches);
