//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! import, synthetic) so the runner can swap implementations and tests can
//! inject fixed series. Providers return a fully validated [`PriceSeries`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{CanonicalizeReport, PriceBar, PriceSeries};

/// Structured error types for data operations.
///
/// Every variant means "no series for this request". None of them is fatal
/// to the caller; the runner reports them as data-unavailable outcomes.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no trading data for {symbol} in [{start}, {end})")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("csv import error: {0}")]
    Csv(String),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::NetworkUnreachable(_) | DataError::RateLimited { .. }
        )
    }
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series: PriceSeries,
    pub source: DataSource,
    /// Rows the provider had to discard while building the series.
    pub cleaning: CanonicalizeReport,
}

impl FetchResult {
    /// Canonicalize provider rows into a series, restricted to `[start, end)`.
    ///
    /// Returns `DataError::NoData` when nothing usable remains.
    pub fn from_bars(
        symbol: &str,
        bars: Vec<PriceBar>,
        start: NaiveDate,
        end: NaiveDate,
        source: DataSource,
    ) -> Result<Self, DataError> {
        let (series, cleaning) = PriceSeries::canonicalize(symbol, bars);
        let series = series.trim(start, end);
        if series.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        Ok(Self {
            series,
            source,
            cleaning,
        })
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataSource::YahooFinance => "yahoo_finance",
            DataSource::CsvImport => "csv_import",
            DataSource::Synthetic => "synthetic",
        };
        f.write_str(name)
    }
}

/// Trait for data providers (Yahoo Finance, CSV import, etc).
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for trading days in `[start, end)`.
    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;
}

impl<P: DataProvider + ?Sized> DataProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        (**self).fetch(symbol, start, end)
    }
}
