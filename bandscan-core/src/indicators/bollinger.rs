//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, window)
//! - Upper: middle + mult * stddev(close, window)
//! - Lower: middle - mult * stddev(close, window)
//!
//! Stddev divisor follows [`StdDevMode`] (sample by default).
//! Lookback: window - 1.

use serde::{Deserialize, Serialize};

use super::rolling::{rolling_mean, rolling_std, StdDevMode};

/// One bar's band values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBand {
    pub mid: f64,
    pub std: f64,
    pub high: f64,
    pub low: f64,
    pub width: f64,
}

impl BollingerBand {
    pub fn from_mid_std(mid: f64, std: f64, multiplier: f64) -> Self {
        let high = mid + multiplier * std;
        let low = mid - multiplier * std;
        Self {
            mid,
            std,
            high,
            low,
            width: high - low,
        }
    }
}

/// Compute the band for every bar; `None` until the window is full.
pub fn bollinger_bands(
    closes: &[f64],
    window: usize,
    multiplier: f64,
    mode: StdDevMode,
) -> Vec<Option<BollingerBand>> {
    let mids = rolling_mean(closes, window);
    let stds = rolling_std(closes, window, mode);
    mids.into_iter()
        .zip(stds)
        .map(|(mid, std)| Some(BollingerBand::from_mid_std(mid?, std?, multiplier)))
        .collect()
}
