//! Signal filter: selects the bars that satisfy [`SignalCriteria`].
//!
//! Pure filter over a series and its aligned indicator rows. A bar whose
//! required indicator is `None` never qualifies; this is decided by an
//! explicit match, not by a NaN comparison falling through to false.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::criteria::{BandMode, SignalCriteria};
use crate::domain::{PriceBar, PriceSeries};
use crate::indicators::{IndicatorRow, IndicatorSeries};

/// Chart markers are drawn this far above the bar high.
pub const MARKER_OFFSET: f64 = 1.02;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("indicator rows are not aligned with the series ({series_len} bars, {indicator_len} rows)")]
    Misaligned {
        series_len: usize,
        indicator_len: usize,
    },
}

/// A qualifying bar together with the values that made it qualify.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub date: NaiveDate,
    /// Position in the series the filter ran over.
    pub index: usize,
    pub close: f64,
    pub high: f64,
    /// Lots.
    pub volume: f64,
    /// Lots.
    pub vol_ma: f64,
    pub volume_ratio: f64,
    pub bb_width: Option<f64>,
    /// Band boundary after tolerance, when a band mode is active.
    pub trigger_price: Option<f64>,
}

impl Signal {
    pub fn marker_price(&self) -> f64 {
        self.high * MARKER_OFFSET
    }
}

fn volume_condition(bar: &PriceBar, row: &IndicatorRow, criteria: &SignalCriteria) -> bool {
    match row.vol_ma {
        Some(vol_ma) => bar.volume > vol_ma * criteria.volume_multiplier,
        None => false,
    }
}

/// Band boundary adjusted by the tolerance, `None` for `BandMode::None` or
/// when the band is not defined on this row.
pub fn trigger_price(row: &IndicatorRow, criteria: &SignalCriteria) -> Option<f64> {
    let tolerance = criteria.tolerance();
    match criteria.band_mode {
        BandMode::None => None,
        BandMode::NearUpper => row.bb_high().map(|high| high * (1.0 - tolerance)),
        BandMode::NearLower => row.bb_low().map(|low| low * (1.0 + tolerance)),
    }
}

/// Whether a single bar qualifies. Boundaries are inclusive.
pub fn qualifies(bar: &PriceBar, row: &IndicatorRow, criteria: &SignalCriteria) -> bool {
    if !volume_condition(bar, row, criteria) {
        return false;
    }
    match criteria.band_mode {
        BandMode::None => true,
        BandMode::NearUpper => {
            matches!(trigger_price(row, criteria), Some(trigger) if bar.close >= trigger)
        }
        BandMode::NearLower => {
            matches!(trigger_price(row, criteria), Some(trigger) if bar.close <= trigger)
        }
    }
}

/// Filter the series down to its signal bars, in chronological order.
pub fn filter_signals(
    series: &PriceSeries,
    indicators: &IndicatorSeries,
    criteria: &SignalCriteria,
) -> Result<Vec<Signal>, FilterError> {
    if !indicators.is_aligned_with(series) {
        return Err(FilterError::Misaligned {
            series_len: series.len(),
            indicator_len: indicators.len(),
        });
    }

    let signals = series
        .bars()
        .iter()
        .zip(indicators.rows())
        .enumerate()
        .filter(|(_, (bar, row))| qualifies(bar, row, criteria))
        .filter_map(|(index, (bar, row))| {
            let vol_ma = row.vol_ma?;
            Some(Signal {
                date: bar.date,
                index,
                close: bar.close,
                high: bar.high,
                volume: bar.volume,
                vol_ma,
                volume_ratio: bar.volume / vol_ma,
                bb_width: row.bb_width(),
                trigger_price: trigger_price(row, criteria),
            })
        })
        .collect();

    Ok(signals)
}

pub fn signal_dates(signals: &[Signal]) -> Vec<NaiveDate> {
    signals.iter().map(|s| s.date).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{
        assert_approx, compute_indicators, make_series, make_series_with_volume, BollingerBand,
        IndicatorParams, DEFAULT_EPSILON,
    };

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Duration::days(n)
    }

    fn bar(close: f64, volume: f64) -> PriceBar {
        PriceBar {
            date: day(0),
            open: close,
            high: close * 1.05,
            low: close * 0.95,
            close,
            volume,
        }
    }

    fn row(mid: f64, std: f64, vol_ma: Option<f64>) -> IndicatorRow {
        IndicatorRow {
            date: day(0),
            bands: Some(BollingerBand::from_mid_std(mid, std, 2.0)),
            vol_ma,
        }
    }

    /// 25 bars at close 100; volume 100 except 500 on bar 19.
    fn surge_series() -> PriceSeries {
        let mut volumes = vec![100.0; 25];
        volumes[19] = 500.0;
        make_series_with_volume(&[100.0; 25], &volumes)
    }

    #[test]
    fn volume_surge_scenario() {
        let series = surge_series();
        let ind = compute_indicators(&series, &IndicatorParams::default());
        let row19 = ind.get(19).unwrap();
        assert_approx(row19.vol_ma.unwrap(), 120.0, DEFAULT_EPSILON);
        assert_eq!(row19.bb_high(), Some(100.0));
        assert_eq!(row19.bb_low(), Some(100.0));

        let signals = filter_signals(&series, &ind, &SignalCriteria::volume_only(1.5)).unwrap();
        assert_eq!(signals.len(), 1);
        let s = signals[0];
        assert_eq!(s.index, 19);
        assert_eq!(s.date, day(19));
        assert_approx(s.volume_ratio, 500.0 / 120.0, DEFAULT_EPSILON);
        assert_eq!(s.bb_width, Some(0.0));
        assert_eq!(s.trigger_price, None);
    }

    #[test]
    fn undefined_volume_average_never_qualifies() {
        let r = IndicatorRow {
            date: day(0),
            bands: None,
            vol_ma: None,
        };
        assert!(!qualifies(&bar(100.0, 1e9), &r, &SignalCriteria::volume_only(1.0)));
    }

    #[test]
    fn volume_condition_is_strict() {
        let r = row(100.0, 1.0, Some(100.0));
        // 150 is not > 100 * 1.5
        assert!(!qualifies(&bar(100.0, 150.0), &r, &SignalCriteria::volume_only(1.5)));
        assert!(qualifies(&bar(100.0, 150.1), &r, &SignalCriteria::volume_only(1.5)));
    }

    #[test]
    fn near_upper_boundary_is_inclusive() {
        // mid 100, std 5, k 2 → high 110
        let r = row(100.0, 5.0, Some(100.0));
        let c = SignalCriteria::volume_only(1.5).with_band(BandMode::NearUpper, 0.0);
        assert!(qualifies(&bar(110.0, 200.0), &r, &c));
        assert!(!qualifies(&bar(109.99, 200.0), &r, &c));
    }

    #[test]
    fn near_upper_tolerance_widens_trigger() {
        let r = row(100.0, 5.0, Some(100.0));
        let c = SignalCriteria::volume_only(1.5).with_band(BandMode::NearUpper, 1.0);
        // trigger = 110 * 0.99 = 108.9
        assert_approx(trigger_price(&r, &c).unwrap(), 108.9, 1e-9);
        assert!(qualifies(&bar(109.0, 200.0), &r, &c));
        assert!(!qualifies(&bar(108.0, 200.0), &r, &c));
    }

    #[test]
    fn near_lower_uses_low_band() {
        // low = 90; trigger with 2% tolerance = 91.8
        let r = row(100.0, 5.0, Some(100.0));
        let c = SignalCriteria::volume_only(1.5).with_band(BandMode::NearLower, 2.0);
        assert_approx(trigger_price(&r, &c).unwrap(), 91.8, 1e-9);
        assert!(qualifies(&bar(91.0, 200.0), &r, &c));
        assert!(qualifies(&bar(90.0, 200.0), &r, &c));
        assert!(!qualifies(&bar(95.0, 200.0), &r, &c));
    }

    #[test]
    fn band_mode_without_bands_never_qualifies() {
        let r = IndicatorRow {
            date: day(0),
            bands: None,
            vol_ma: Some(100.0),
        };
        let c = SignalCriteria::volume_only(1.5).with_band(BandMode::NearLower, 50.0);
        assert!(!qualifies(&bar(1.0, 1000.0), &r, &c));
        // Volume-only mode does not need the band.
        assert!(qualifies(&bar(1.0, 1000.0), &r, &SignalCriteria::volume_only(1.5)));
    }

    #[test]
    fn misaligned_inputs_are_rejected() {
        let series = make_series(&[100.0; 25]);
        let other = make_series(&[100.0; 24]);
        let ind = compute_indicators(&other, &IndicatorParams::default());
        let err = filter_signals(&series, &ind, &SignalCriteria::default()).unwrap_err();
        assert_eq!(
            err,
            FilterError::Misaligned {
                series_len: 25,
                indicator_len: 24
            }
        );
    }

    #[test]
    fn empty_series_has_no_signals() {
        let series = make_series(&[]);
        let ind = compute_indicators(&series, &IndicatorParams::default());
        assert!(filter_signals(&series, &ind, &SignalCriteria::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn marker_sits_above_high() {
        let series = surge_series();
        let ind = compute_indicators(&series, &IndicatorParams::default());
        let s = filter_signals(&series, &ind, &SignalCriteria::default()).unwrap()[0];
        assert_approx(s.marker_price(), s.high * 1.02, DEFAULT_EPSILON);
        assert_eq!(signal_dates(&[s]), vec![day(19)]);
    }
}
