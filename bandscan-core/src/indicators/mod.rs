//! Indicator engine: Bollinger Bands and the rolling volume average.
//!
//! Indicators are pure functions of a [`PriceSeries`](crate::domain::PriceSeries):
//! computed once per request, never mutated, recomputed on parameter change.
//! "Not yet defined" is `None`, never a NaN sentinel.

pub mod bollinger;
pub mod engine;
pub mod rolling;

pub use bollinger::{bollinger_bands, BollingerBand};
pub use engine::{
    compute_indicators, IndicatorParams, IndicatorRow, IndicatorSeries, ParamsError,
    DEFAULT_STD_MULTIPLIER, DEFAULT_VOLUME_WINDOW, DEFAULT_WINDOW,
};
pub use rolling::{rolling_mean, rolling_std, StdDevMode};

/// Create a synthetic series from close prices for testing.
///
/// open = prev_close (or close for the first bar), high/low 1% outside
/// the open/close range, volume = 1000 lots, one bar per calendar day.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> crate::domain::PriceSeries {
    make_series_with_volume(closes, &vec![1000.0; closes.len()])
}

#[cfg(test)]
pub fn make_series_with_volume(closes: &[f64], volumes: &[f64]) -> crate::domain::PriceSeries {
    use crate::domain::{PriceBar, PriceSeries};
    assert_eq!(closes.len(), volumes.len());
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume,
            }
        })
        .collect();
    PriceSeries::new("TEST.TW", bars).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
