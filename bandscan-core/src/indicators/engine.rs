//! Indicator engine: derives the per-bar Bollinger and volume-average rows.
//!
//! The output is aligned 1:1 with the input series. Warm-up bars carry `None`
//! for whichever indicator is not yet defined; the Bollinger window and the
//! volume window are independent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bollinger::{bollinger_bands, BollingerBand};
use super::rolling::{rolling_mean, StdDevMode};
use crate::domain::PriceSeries;

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_STD_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_VOLUME_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("window must be >= {min} for {mode:?} stddev, got {window}")]
    WindowTooSmall {
        window: usize,
        min: usize,
        mode: StdDevMode,
    },

    #[error("volume_window must be >= 1")]
    ZeroVolumeWindow,

    #[error("std_multiplier must be finite and >= 0, got {0}")]
    InvalidMultiplier(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    /// Bollinger window in bars.
    pub window: usize,
    pub std_multiplier: f64,
    /// Volume moving-average window in bars.
    pub volume_window: usize,
    pub std_dev: StdDevMode,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            std_multiplier: DEFAULT_STD_MULTIPLIER,
            volume_window: DEFAULT_VOLUME_WINDOW,
            std_dev: StdDevMode::Sample,
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        let min = match self.std_dev {
            StdDevMode::Sample => 2,
            StdDevMode::Population => 1,
        };
        if self.window < min {
            return Err(ParamsError::WindowTooSmall {
                window: self.window,
                min,
                mode: self.std_dev,
            });
        }
        if self.volume_window == 0 {
            return Err(ParamsError::ZeroVolumeWindow);
        }
        if !self.std_multiplier.is_finite() || self.std_multiplier < 0.0 {
            return Err(ParamsError::InvalidMultiplier(self.std_multiplier));
        }
        Ok(())
    }

    /// Bars needed before every indicator is defined.
    pub fn lookback(&self) -> usize {
        self.window.max(self.volume_window).saturating_sub(1)
    }
}

/// Derived values for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub bands: Option<BollingerBand>,
    pub vol_ma: Option<f64>,
}

impl IndicatorRow {
    pub fn bb_mid(&self) -> Option<f64> {
        self.bands.map(|b| b.mid)
    }

    pub fn bb_high(&self) -> Option<f64> {
        self.bands.map(|b| b.high)
    }

    pub fn bb_low(&self) -> Option<f64> {
        self.bands.map(|b| b.low)
    }

    pub fn bb_width(&self) -> Option<f64> {
        self.bands.map(|b| b.width)
    }

    /// Both the band and the volume average are available.
    pub fn is_defined(&self) -> bool {
        self.bands.is_some() && self.vol_ma.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    params: IndicatorParams,
    rows: Vec<IndicatorRow>,
}

impl IndicatorSeries {
    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows with every indicator defined.
    pub fn defined_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_defined()).count()
    }

    /// Fraction of rows with every indicator defined (0.0 for an empty series).
    pub fn coverage(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        self.defined_count() as f64 / self.rows.len() as f64
    }

    /// Band width on the last bar, if defined there.
    pub fn latest_width(&self) -> Option<f64> {
        self.rows.last().and_then(IndicatorRow::bb_width)
    }

    /// Same length and same dates as `series`.
    pub fn is_aligned_with(&self, series: &PriceSeries) -> bool {
        self.rows.len() == series.len()
            && self
                .rows
                .iter()
                .zip(series.bars())
                .all(|(row, bar)| row.date == bar.date)
    }

    /// Rows for the index range `range`, keeping the params.
    pub fn slice(&self, range: std::ops::Range<usize>) -> Self {
        Self {
            params: self.params,
            rows: self.rows[range].to_vec(),
        }
    }
}

/// Compute Bollinger Bands and the volume moving average for every bar.
///
/// Never fails: a series shorter than a window simply yields `None` for that
/// indicator on every row, and an empty series yields no rows.
pub fn compute_indicators(series: &PriceSeries, params: &IndicatorParams) -> IndicatorSeries {
    let closes = series.closes();
    let volumes = series.volumes();

    let bands = bollinger_bands(&closes, params.window, params.std_multiplier, params.std_dev);
    let vol_ma = rolling_mean(&volumes, params.volume_window);

    let rows = series
        .dates()
        .zip(bands)
        .zip(vol_ma)
        .map(|((date, bands), vol_ma)| IndicatorRow {
            date,
            bands,
            vol_ma,
        })
        .collect();

    IndicatorSeries {
        params: *params,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_series, make_series_with_volume, DEFAULT_EPSILON};

    #[test]
    fn default_params_are_20_2_20_sample() {
        let p = IndicatorParams::default();
        assert_eq!(p.window, 20);
        assert_eq!(p.std_multiplier, 2.0);
        assert_eq!(p.volume_window, 20);
        assert_eq!(p.std_dev, StdDevMode::Sample);
        assert_eq!(p.lookback(), 19);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn validate_rejects_degenerate_params() {
        let p = IndicatorParams {
            window: 1,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(ParamsError::WindowTooSmall { .. })));

        let p = IndicatorParams {
            window: 1,
            std_dev: StdDevMode::Population,
            ..Default::default()
        };
        assert!(p.validate().is_ok());

        let p = IndicatorParams {
            volume_window: 0,
            ..Default::default()
        };
        assert_eq!(p.validate(), Err(ParamsError::ZeroVolumeWindow));

        let p = IndicatorParams {
            std_multiplier: -1.0,
            ..Default::default()
        };
        assert!(matches!(p.validate(), Err(ParamsError::InvalidMultiplier(_))));
    }

    #[test]
    fn rows_are_aligned_with_series() {
        let series = make_series(&[10.0; 30]);
        let ind = compute_indicators(&series, &IndicatorParams::default());
        assert_eq!(ind.len(), 30);
        assert!(ind.is_aligned_with(&series));
    }

    #[test]
    fn warmup_rows_are_undefined() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let ind = compute_indicators(&make_series(&closes), &IndicatorParams::default());
        for row in &ind.rows()[..19] {
            assert!(row.bands.is_none());
            assert!(row.vol_ma.is_none());
        }
        assert!(ind.rows()[19].is_defined());
        assert_eq!(ind.defined_count(), 6);
    }

    #[test]
    fn short_series_is_entirely_undefined() {
        let ind = compute_indicators(&make_series(&[100.0; 10]), &IndicatorParams::default());
        assert_eq!(ind.len(), 10);
        assert_eq!(ind.defined_count(), 0);
        assert_eq!(ind.coverage(), 0.0);
        assert_eq!(ind.latest_width(), None);
    }

    #[test]
    fn empty_series_gives_empty_indicators() {
        let ind = compute_indicators(&make_series(&[]), &IndicatorParams::default());
        assert!(ind.is_empty());
        assert_eq!(ind.coverage(), 0.0);
    }

    #[test]
    fn independent_windows() {
        let params = IndicatorParams {
            window: 5,
            volume_window: 3,
            ..Default::default()
        };
        let ind = compute_indicators(&make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]), &params);
        assert!(ind.rows()[2].vol_ma.is_some());
        assert!(ind.rows()[2].bands.is_none());
        assert!(ind.rows()[4].is_defined());
        assert_eq!(params.lookback(), 4);
    }

    #[test]
    fn volume_average_uses_lots() {
        let volumes = [100.0, 200.0, 300.0];
        let series = make_series_with_volume(&[10.0, 10.0, 10.0], &volumes);
        let params = IndicatorParams {
            window: 3,
            volume_window: 3,
            ..Default::default()
        };
        let ind = compute_indicators(&series, &params);
        assert_approx(ind.rows()[2].vol_ma.unwrap(), 200.0, DEFAULT_EPSILON);
    }

    #[test]
    fn latest_width_reads_last_row() {
        let closes = [10.0, 11.0, 12.0];
        let params = IndicatorParams {
            window: 3,
            volume_window: 3,
            ..Default::default()
        };
        let ind = compute_indicators(&make_series(&closes), &params);
        assert_approx(ind.latest_width().unwrap(), 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn slice_keeps_params_and_dates() {
        let series = make_series(&[10.0; 30]);
        let ind = compute_indicators(&series, &IndicatorParams::default());
        let sliced = ind.slice(19..30);
        assert_eq!(sliced.len(), 11);
        assert_eq!(sliced.coverage(), 1.0);
        assert_eq!(sliced.rows()[0].date, series.get(19).unwrap().date);
    }
}
