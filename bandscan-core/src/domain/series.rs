//! PriceSeries: an immutable, strictly date-ordered run of bars for one symbol.
//!
//! Non-trading days are simply absent. The only way to build a series is
//! through [`PriceSeries::new`] (strict) or [`PriceSeries::canonicalize`]
//! (sorts, drops duplicates and insane bars), so every series in the engine
//! upholds the ordering invariant.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::bar::{BarError, PriceBar};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("dates not strictly increasing at index {index}: {previous} then {current}")]
    NotIncreasing {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("invalid bar at index {index}: {source}")]
    InvalidBar {
        index: usize,
        #[source]
        source: BarError,
    },
}

/// What [`PriceSeries::canonicalize`] had to discard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalizeReport {
    pub duplicates_dropped: usize,
    pub invalid_dropped: usize,
}

impl CanonicalizeReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates_dropped == 0 && self.invalid_dropped == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order dates, duplicates and insane bars.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (index, bar) in bars.iter().enumerate() {
            bar.validate()
                .map_err(|source| SeriesError::InvalidBar { index, source })?;
            if index > 0 && bars[index - 1].date >= bar.date {
                return Err(SeriesError::NotIncreasing {
                    index,
                    previous: bars[index - 1].date,
                    current: bar.date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// Sort by date, keep the first bar for each date, drop bars that fail validation.
    pub fn canonicalize(
        symbol: impl Into<String>,
        mut bars: Vec<PriceBar>,
    ) -> (Self, CanonicalizeReport) {
        let mut report = CanonicalizeReport::default();

        let before = bars.len();
        bars.retain(PriceBar::is_sane);
        report.invalid_dropped = before - bars.len();

        // Stable sort keeps provider order among equal dates, so dedup keeps the first.
        bars.sort_by_key(|b| b.date);
        let before = bars.len();
        bars.dedup_by_key(|b| b.date);
        report.duplicates_dropped = before - bars.len();

        let series = Self {
            symbol: symbol.into(),
            bars,
        };
        (series, report)
    }

    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PriceBar> {
        self.bars.get(index)
    }

    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Index of the bar on `date`, if the series has one.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.bars.binary_search_by_key(&date, |b| b.date).ok()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(|b| b.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Index range `[lo, hi)` of the bars dated within `[start, end)`.
    pub fn range_indices(&self, start: NaiveDate, end: NaiveDate) -> std::ops::Range<usize> {
        let lo = self.bars.partition_point(|b| b.date < start);
        let hi = self.bars.partition_point(|b| b.date < end).max(lo);
        lo..hi
    }

    /// New series restricted to bars dated within `[start, end)`.
    pub fn trim(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let range = self.range_indices(start, end);
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars[range].to_vec(),
        }
    }
}
