//! Volume-multiplier sweep over a single loaded window.
//!
//! Loads and computes indicators once, then re-runs the filter and the
//! evaluator for every multiplier on the grid in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use bandscan_core::data::DataProvider;
use bandscan_core::evaluation::PerformanceReport;
use bandscan_core::signals::SignalCriteria;

use crate::period::DateRange;
use crate::runner::{analyze_window, load_window, LoadedWindow, ScanError, ScanOutcome, ScanRequest};

/// Upper bound on grid points a single sweep will evaluate.
pub const MAX_GRID_POINTS: usize = 1_000;

/// Evenly spaced multipliers `from, from + step, ..., to` (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierGrid {
    pub from: f64,
    pub to: f64,
    pub step: f64,
}

impl Default for MultiplierGrid {
    /// The dashboard slider: 1.0 to 3.0 in steps of 0.1.
    fn default() -> Self {
        Self {
            from: 1.0,
            to: 3.0,
            step: 0.1,
        }
    }
}

impl MultiplierGrid {
    pub fn validate(&self) -> Result<(), ScanError> {
        let finite = self.from.is_finite() && self.to.is_finite() && self.step.is_finite();
        if !finite || self.step <= 0.0 {
            return Err(ScanError::InvalidGrid(format!(
                "step must be positive, got {}",
                self.step
            )));
        }
        if self.from < 1.0 || self.to < self.from {
            return Err(ScanError::InvalidGrid(format!(
                "need 1.0 <= from <= to, got from={} to={}",
                self.from, self.to
            )));
        }
        let points = ((self.to - self.from) / self.step + 1e-9).floor() + 1.0;
        if points > MAX_GRID_POINTS as f64 {
            return Err(ScanError::InvalidGrid(format!(
                "{points} points exceeds the limit of {MAX_GRID_POINTS}"
            )));
        }
        Ok(())
    }

    /// Grid points, computed by index and rounded to 1e-9 so 0.1 steps land exactly.
    pub fn values(&self) -> Vec<f64> {
        if self.validate().is_err() {
            return Vec::new();
        }
        let count = ((self.to - self.from) / self.step + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|i| ((self.from + i as f64 * self.step) * 1e9).round() / 1e9)
            .collect()
    }

    pub fn size(&self) -> usize {
        self.values().len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub volume_multiplier: f64,
    pub signal_count: usize,
    pub performance: PerformanceReport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub symbol: String,
    pub range: DateRange,
    pub base_criteria: SignalCriteria,
    pub points: Vec<SweepPoint>,
}

/// Evaluate every grid multiplier against one window; other criteria fields
/// come from `base`. Points are returned in grid order.
pub fn sweep_window(
    window: &LoadedWindow,
    base: &SignalCriteria,
    grid: &MultiplierGrid,
    horizons: &[usize],
) -> Result<Vec<SweepPoint>, ScanError> {
    grid.validate()?;
    grid.values()
        .into_par_iter()
        .map(|multiplier| {
            let criteria = SignalCriteria {
                volume_multiplier: multiplier,
                ..*base
            };
            let (signals, performance) = analyze_window(window, &criteria, horizons)?;
            Ok(SweepPoint {
                volume_multiplier: multiplier,
                signal_count: signals.len(),
                performance,
            })
        })
        .collect()
}

/// Load the request's window once and sweep the grid over it.
pub fn run_sweep(
    provider: &dyn DataProvider,
    request: &ScanRequest,
    grid: &MultiplierGrid,
) -> Result<ScanOutcome<SweepReport>, ScanError> {
    grid.validate()?;
    let window = match load_window(provider, request)? {
        ScanOutcome::Completed(window) => window,
        ScanOutcome::DataUnavailable { symbol, reason } => {
            return Ok(ScanOutcome::DataUnavailable { symbol, reason })
        }
    };

    let points = sweep_window(&window, &request.criteria, grid, &request.horizons)?;
    info!(symbol = %window.symbol, points = points.len(), "sweep complete");

    Ok(ScanOutcome::Completed(SweepReport {
        symbol: window.symbol,
        range: window.range,
        base_criteria: request.criteria,
        points,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandscan_core::data::SyntheticProvider;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn grid_values_are_increasing_and_bounded(
            from in 1.0..3.0_f64,
            span in 0.0..3.0_f64,
            step in 0.05..1.0_f64,
        ) {
            let grid = MultiplierGrid { from, to: from + span, step };
            let values = grid.values();
            prop_assert!(!values.is_empty());
            prop_assert!((values[0] - from).abs() < 1e-6);
            prop_assert!(values.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(values.iter().all(|&v| v <= grid.to + 1e-6));
        }
    }

    #[test]
    fn default_grid_matches_slider() {
        let values = MultiplierGrid::default().values();
        assert_eq!(values.len(), 21);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[5], 1.5);
        assert_eq!(values[20], 3.0);
    }

    #[test]
    fn invalid_grids_are_rejected() {
        let zero_step = MultiplierGrid {
            step: 0.0,
            ..MultiplierGrid::default()
        };
        assert!(zero_step.validate().is_err());
        assert!(zero_step.values().is_empty());

        let inverted = MultiplierGrid {
            from: 2.0,
            to: 1.5,
            step: 0.1,
        };
        assert!(matches!(inverted.validate(), Err(ScanError::InvalidGrid(_))));

        let below_one = MultiplierGrid {
            from: 0.5,
            ..MultiplierGrid::default()
        };
        assert!(below_one.validate().is_err());
    }

    #[test]
    fn oversized_grid_is_rejected_without_allocating() {
        let huge = MultiplierGrid {
            from: 1.0,
            to: 1e9,
            step: 1e-9,
        };
        assert!(matches!(huge.validate(), Err(ScanError::InvalidGrid(_))));
        assert_eq!(huge.size(), 0);

        let at_limit = MultiplierGrid {
            from: 1.0,
            to: 1.0 + (MAX_GRID_POINTS - 1) as f64 * 0.5,
            step: 0.5,
        };
        assert_eq!(at_limit.size(), MAX_GRID_POINTS);
    }

    #[test]
    fn signal_count_is_monotone_across_grid() {
        let request = ScanRequest::new(
            "2330",
            DateRange::new(
                NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ),
        );
        let report = run_sweep(&SyntheticProvider::new(), &request, &MultiplierGrid::default())
            .unwrap()
            .completed()
            .unwrap();

        assert_eq!(report.symbol, "2330.TW");
        assert_eq!(report.points.len(), 21);
        assert!(report
            .points
            .windows(2)
            .all(|w| w[0].volume_multiplier < w[1].volume_multiplier
                && w[0].signal_count >= w[1].signal_count));
        assert!(report.points[0].signal_count > 0);
    }
}
