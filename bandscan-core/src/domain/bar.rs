//! PriceBar: one trading day of OHLCV data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw shares per traded lot. Volumes are stored in lots, not shares.
pub const VOLUME_LOT_SIZE: f64 = 1000.0;

/// Daily OHLCV bar for a single security.
///
/// Prices are split/dividend adjusted by the provider. `volume` is expressed
/// in lots (raw shares / [`VOLUME_LOT_SIZE`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BarError {
    #[error("bar {date} has a missing (NaN) field")]
    Void { date: NaiveDate },

    #[error("bar {date} violates low <= open/close <= high (o={open} h={high} l={low} c={close})")]
    OutOfRange {
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("bar {date} has a non-positive price")]
    NonPositivePrice { date: NaiveDate },

    #[error("bar {date} has negative volume {volume}")]
    NegativeVolume { date: NaiveDate, volume: f64 },
}

impl PriceBar {
    /// Build a bar from a provider row whose volume is counted in shares.
    pub fn from_raw(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        raw_shares: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume: raw_shares as f64 / VOLUME_LOT_SIZE,
        }
    }

    /// Returns true if any OHLCV field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Check the OHLC ordering, price positivity and volume sign.
    pub fn validate(&self) -> Result<(), BarError> {
        if self.is_void() {
            return Err(BarError::Void { date: self.date });
        }
        if self.open <= 0.0 || self.high <= 0.0 || self.low <= 0.0 || self.close <= 0.0 {
            return Err(BarError::NonPositivePrice { date: self.date });
        }
        let ordered = self.low <= self.high
            && self.low <= self.open
            && self.open <= self.high
            && self.low <= self.close
            && self.close <= self.high;
        if !ordered {
            return Err(BarError::OutOfRange {
                date: self.date,
                open: self.open,
                high: self.high,
                low: self.low,
                close: self.close,
            });
        }
        if self.volume < 0.0 {
            return Err(BarError::NegativeVolume {
                date: self.date,
                volume: self.volume,
            });
        }
        Ok(())
    }

    pub fn is_sane(&self) -> bool {
        self.validate().is_ok()
    }
}
