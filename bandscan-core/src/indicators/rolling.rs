//! Rolling-window primitives shared by the Bollinger and volume indicators.
//!
//! Each output is aligned 1:1 with the input. Positions inside the warm-up
//! (first `window - 1` values) are `None`. Every window is summed from
//! scratch so the result for bar `i` never depends on accumulated error from
//! earlier bars.

use serde::{Deserialize, Serialize};

/// Divisor used for the rolling standard deviation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdDevMode {
    /// Divide by `n - 1`.
    #[default]
    Sample,
    /// Divide by `n`.
    Population,
}

impl StdDevMode {
    /// Divisor for a window of `n` values, `None` when it would be zero.
    pub fn divisor(self, n: usize) -> Option<f64> {
        let d = match self {
            StdDevMode::Sample => n.checked_sub(1)?,
            StdDevMode::Population => n,
        };
        (d > 0).then_some(d as f64)
    }
}

fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// Simple moving average over `window` values.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = vec![None; values.len()];
    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        *slot = Some(mean(&values[i + 1 - window..=i]));
    }
    out
}

/// Rolling standard deviation over `window` values (two-pass per window).
pub fn rolling_std(values: &[f64], window: usize, mode: StdDevMode) -> Vec<Option<f64>> {
    let Some(divisor) = mode.divisor(window) else {
        return vec![None; values.len()];
    };
    let mut out = vec![None; values.len()];
    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        let w = &values[i + 1 - window..=i];
        let m = mean(w);
        let ss: f64 = w.iter().map(|v| (v - m) * (v - m)).sum();
        *slot = Some((ss / divisor).sqrt());
    }
    out
}
