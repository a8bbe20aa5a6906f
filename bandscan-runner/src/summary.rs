//! Headline numbers shown above the signal table.

use serde::{Deserialize, Serialize};

use bandscan_core::domain::PriceSeries;
use bandscan_core::indicators::IndicatorSeries;
use bandscan_core::signals::Signal;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Bars in the displayed window.
    pub bars: usize,
    /// First to last close of the displayed window, as a fraction.
    pub period_return: Option<f64>,
    pub signal_count: usize,
    /// Bollinger band width on the last displayed bar.
    pub latest_width: Option<f64>,
    /// Fraction of displayed bars with every indicator defined.
    pub indicator_coverage: f64,
}

impl ScanSummary {
    pub fn compute(series: &PriceSeries, indicators: &IndicatorSeries, signals: &[Signal]) -> Self {
        Self {
            bars: series.len(),
            period_return: period_return(series),
            signal_count: signals.len(),
            latest_width: indicators.latest_width(),
            indicator_coverage: indicators.coverage(),
        }
    }

    /// No bar in the window had enough history for the indicators.
    pub fn insufficient_history(&self) -> bool {
        self.bars > 0 && self.indicator_coverage == 0.0
    }
}

/// `(last.close - first.close) / first.close`; `None` for an empty series.
pub fn period_return(series: &PriceSeries) -> Option<f64> {
    let first = series.first()?.close;
    let last = series.last()?.close;
    Some((last - first) / first)
}
