//! Synthetic data provider for demos and offline development.
//!
//! Produces a deterministic random walk per symbol (seeded from the BLAKE3
//! hash of the symbol) with occasional volume bursts so the signal filter has
//! something to find. The walk always starts at a fixed epoch, so two
//! requests for overlapping ranges agree on the overlapping bars.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, DataSource, FetchResult};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    epoch: NaiveDate,
    start_price: f64,
    /// Probability that a session trades at a multiple of its usual volume.
    burst_probability: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            epoch: NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(NaiveDate::MIN),
            start_price: 100.0,
            burst_probability: 0.05,
        }
    }
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn generate(&self, symbol: &str, end: NaiveDate) -> Vec<PriceBar> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut bars = Vec::new();
        let mut price = self.start_price;
        let mut current = self.epoch;

        while current < end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let mut shares = rng.gen_range(500_000..5_000_000u64);
            if rng.gen_bool(self.burst_probability) {
                shares *= rng.gen_range(3..6u64);
            }

            bars.push(PriceBar::from_raw(current, open, high, low, close, shares));
            price = close;
            current += chrono::Duration::days(1);
        }

        bars
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let bars = self.generate(symbol, end);
        FetchResult::from_bars(symbol, bars, start, end, DataSource::Synthetic)
    }
}
