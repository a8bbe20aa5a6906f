//! Forward-return evaluation: what happened `h` bars after each signal.
//!
//! Horizons are counted in trading bars, not calendar days. A signal too
//! close to the end of the series for a given horizon contributes nothing to
//! that horizon's aggregate (it is not counted as a zero return).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;

pub const DEFAULT_HORIZONS: [usize; 4] = [1, 5, 10, 20];

/// Aggregate for one holding horizon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonStats {
    pub horizon: usize,
    pub sample_count: usize,
    /// `None` when `sample_count == 0`.
    pub average_return: Option<f64>,
    /// Fraction of returns strictly above zero; `None` when `sample_count == 0`.
    pub win_rate: Option<f64>,
}

impl HorizonStats {
    pub fn from_returns(horizon: usize, returns: &[f64]) -> Self {
        if returns.is_empty() {
            return Self {
                horizon,
                sample_count: 0,
                average_return: None,
                win_rate: None,
            };
        }
        let n = returns.len() as f64;
        let wins = returns.iter().filter(|&&r| r > 0.0).count();
        Self {
            horizon,
            sample_count: returns.len(),
            average_return: Some(returns.iter().sum::<f64>() / n),
            win_rate: Some(wins as f64 / n),
        }
    }

    pub fn has_data(&self) -> bool {
        self.sample_count > 0
    }
}

/// Per-horizon aggregates, ordered by horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    by_horizon: BTreeMap<usize, HorizonStats>,
}

impl PerformanceReport {
    pub fn get(&self, horizon: usize) -> Option<&HorizonStats> {
        self.by_horizon.get(&horizon)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HorizonStats> {
        self.by_horizon.values()
    }

    pub fn horizons(&self) -> Vec<usize> {
        self.by_horizon.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_horizon.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_horizon.is_empty()
    }
}

/// `(close[index + horizon] - close[index]) / close[index]`, or `None` past the end.
pub fn forward_return(series: &PriceSeries, index: usize, horizon: usize) -> Option<f64> {
    let entry = series.get(index)?.close;
    let exit = series.get(index.checked_add(horizon)?)?.close;
    Some((exit - entry) / entry)
}

/// Forward returns for every signal date that has room for `horizon` more bars.
///
/// Dates missing from the series are skipped.
pub fn forward_returns(
    series: &PriceSeries,
    signal_dates: &[NaiveDate],
    horizon: usize,
) -> Vec<(NaiveDate, f64)> {
    signal_dates
        .iter()
        .filter_map(|&date| {
            let index = series.index_of(date)?;
            forward_return(series, index, horizon).map(|r| (date, r))
        })
        .collect()
}

/// Average forward return and win rate for each horizon.
///
/// Horizons are independent and evaluated in parallel; duplicates collapse.
pub fn evaluate_forward_returns(
    series: &PriceSeries,
    signal_dates: &[NaiveDate],
    horizons: &[usize],
) -> PerformanceReport {
    let by_horizon = horizons
        .par_iter()
        .map(|&horizon| {
            let returns: Vec<f64> = forward_returns(series, signal_dates, horizon)
                .into_iter()
                .map(|(_, r)| r)
                .collect();
            (horizon, HorizonStats::from_returns(horizon, &returns))
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect();

    PerformanceReport { by_horizon }
}
