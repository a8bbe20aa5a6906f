//! Single-scan runner: request in, report out.
//!
//! Orchestrates one analysis:
//! 1. Validate the request (date range, params, criteria) before any I/O
//! 2. Normalize the symbol and fetch `[start - buffer_days, end)`
//! 3. Compute indicators over the whole fetched series
//! 4. Trim series and indicators to the displayed window `[start, end)`
//! 5. Filter signals and evaluate forward returns inside the window
//!
//! A provider failure is an outcome, not an error: the caller gets
//! [`ScanOutcome::DataUnavailable`] with the reason.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use bandscan_core::data::{DataProvider, DataSource};
use bandscan_core::domain::{normalize_symbol, PriceBar, PriceSeries, SymbolError};
use bandscan_core::evaluation::{evaluate_forward_returns, forward_return, PerformanceReport};
use bandscan_core::indicators::{
    compute_indicators, IndicatorParams, IndicatorRow, IndicatorSeries, ParamsError,
};
use bandscan_core::signals::{
    filter_signals, signal_dates, CriteriaError, FilterError, Signal, SignalCriteria,
};

use crate::period::DateRange;
use crate::summary::ScanSummary;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid date range: start {start} must be before end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("buffer of {days} days before {start} is out of the calendar range")]
    BufferOutOfRange { start: NaiveDate, days: u32 },

    #[error("invalid symbol: {0}")]
    Symbol(#[from] SymbolError),

    #[error("invalid indicator parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("invalid signal criteria: {0}")]
    Criteria(#[from] CriteriaError),

    #[error("no evaluation horizons requested")]
    NoHorizons,

    #[error("invalid multiplier grid: {0}")]
    InvalidGrid(String),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

/// Everything needed to run one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Raw user input; normalized before fetching.
    pub symbol: String,
    pub range: DateRange,
    pub buffer_days: u32,
    pub params: IndicatorParams,
    pub criteria: SignalCriteria,
    pub horizons: Vec<usize>,
}

impl ScanRequest {
    pub fn new(symbol: impl Into<String>, range: DateRange) -> Self {
        Self {
            symbol: symbol.into(),
            range,
            buffer_days: crate::config::DEFAULT_BUFFER_DAYS,
            params: IndicatorParams::default(),
            criteria: SignalCriteria::default(),
            horizons: bandscan_core::evaluation::DEFAULT_HORIZONS.to_vec(),
        }
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if !self.range.is_valid() {
            return Err(ScanError::InvalidDateRange {
                start: self.range.start,
                end: self.range.end,
            });
        }
        self.fetch_range()?;
        self.params.validate()?;
        self.criteria.validate()?;
        if self.horizons.is_empty() {
            return Err(ScanError::NoHorizons);
        }
        Ok(())
    }

    /// The display range widened by `buffer_days` of warm-up history.
    pub fn fetch_range(&self) -> Result<DateRange, ScanError> {
        self.range
            .with_buffer(self.buffer_days)
            .ok_or(ScanError::BufferOutOfRange {
                start: self.range.start,
                days: self.buffer_days,
            })
    }
}

/// Result of a scan that got as far as asking the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome<T = ScanReport> {
    Completed(T),
    DataUnavailable { symbol: String, reason: String },
}

impl<T> ScanOutcome<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            ScanOutcome::Completed(value) => Some(value),
            ScanOutcome::DataUnavailable { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ScanOutcome<U> {
        match self {
            ScanOutcome::Completed(value) => ScanOutcome::Completed(f(value)),
            ScanOutcome::DataUnavailable { symbol, reason } => {
                ScanOutcome::DataUnavailable { symbol, reason }
            }
        }
    }
}

/// The displayed window with its indicators, computed with warm-up history.
#[derive(Debug, Clone)]
pub struct LoadedWindow {
    pub symbol: String,
    pub source: DataSource,
    pub range: DateRange,
    pub series: PriceSeries,
    pub indicators: IndicatorSeries,
    /// Bars fetched before the window and used only for warm-up.
    pub buffer_bars: usize,
}

/// Fetch with buffer, compute indicators, trim to the request window.
pub fn load_window(
    provider: &dyn DataProvider,
    request: &ScanRequest,
) -> Result<ScanOutcome<LoadedWindow>, ScanError> {
    request.validate()?;
    let symbol = normalize_symbol(&request.symbol)?.to_string();
    let fetch_range = request.fetch_range()?;

    debug!(
        %symbol,
        provider = provider.name(),
        start = %fetch_range.start,
        end = %fetch_range.end,
        "fetching with warm-up buffer"
    );
    let fetched = match provider.fetch(&symbol, fetch_range.start, fetch_range.end) {
        Ok(fetched) => fetched,
        Err(e) => {
            warn!(%symbol, error = %e, "data unavailable");
            return Ok(ScanOutcome::DataUnavailable {
                symbol,
                reason: e.to_string(),
            });
        }
    };

    let full = fetched.series;
    let full_indicators = compute_indicators(&full, &request.params);
    let window = full.range_indices(request.range.start, request.range.end);
    let buffer_bars = window.start;

    let series = full.trim(request.range.start, request.range.end);
    let indicators = full_indicators.slice(window);
    debug!(%symbol, fetched = full.len(), buffer_bars, displayed = series.len(), "trimmed to window");

    if series.is_empty() {
        warn!(%symbol, range = %request.range, "no bars inside the requested window");
        return Ok(ScanOutcome::DataUnavailable {
            symbol,
            reason: format!("no trading data in {}", request.range),
        });
    }

    Ok(ScanOutcome::Completed(LoadedWindow {
        symbol,
        source: fetched.source,
        range: request.range,
        series,
        indicators,
        buffer_bars,
    }))
}

/// A signal row as exported: the signal, its chart marker and its forward returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub signal: Signal,
    pub marker: f64,
    /// Horizon -> forward return; `None` when the horizon runs past the window.
    pub forward_returns: BTreeMap<usize, Option<f64>>,
}

/// Complete result of a single scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub source: DataSource,
    pub range: DateRange,
    pub params: IndicatorParams,
    pub criteria: SignalCriteria,
    pub horizons: Vec<usize>,
    pub summary: ScanSummary,
    pub bars: Vec<PriceBar>,
    pub indicators: Vec<IndicatorRow>,
    pub signals: Vec<SignalRecord>,
    pub performance: PerformanceReport,
}

fn default_schema_version() -> u32 {
    1
}

/// Filter and evaluate an already loaded window.
pub fn analyze_window(
    window: &LoadedWindow,
    criteria: &SignalCriteria,
    horizons: &[usize],
) -> Result<(Vec<Signal>, PerformanceReport), ScanError> {
    let signals = filter_signals(&window.series, &window.indicators, criteria)?;
    let performance = evaluate_forward_returns(&window.series, &signal_dates(&signals), horizons);
    Ok((signals, performance))
}

/// Run one scan end to end.
pub fn run_scan(
    provider: &dyn DataProvider,
    request: &ScanRequest,
) -> Result<ScanOutcome, ScanError> {
    let window = match load_window(provider, request)? {
        ScanOutcome::Completed(window) => window,
        ScanOutcome::DataUnavailable { symbol, reason } => {
            return Ok(ScanOutcome::DataUnavailable { symbol, reason })
        }
    };

    let (signals, performance) = analyze_window(&window, &request.criteria, &request.horizons)?;
    let summary = ScanSummary::compute(&window.series, &window.indicators, &signals);

    info!(
        symbol = %window.symbol,
        source = %window.source,
        bars = summary.bars,
        signals = summary.signal_count,
        coverage = summary.indicator_coverage,
        "scan complete"
    );
    if summary.insufficient_history() {
        warn!(symbol = %window.symbol, "not enough history for any indicator in the window");
    }

    let horizons: Vec<usize> = performance.horizons();
    let signals = signals
        .into_iter()
        .map(|signal| SignalRecord {
            marker: signal.marker_price(),
            forward_returns: horizons
                .iter()
                .map(|&h| (h, forward_return(&window.series, signal.index, h)))
                .collect(),
            signal,
        })
        .collect();

    Ok(ScanOutcome::Completed(ScanReport {
        schema_version: SCHEMA_VERSION,
        symbol: window.symbol,
        source: window.source,
        range: window.range,
        params: request.params,
        criteria: request.criteria,
        horizons,
        summary,
        bars: window.series.bars().to_vec(),
        indicators: window.indicators.rows().to_vec(),
        signals,
        performance,
    }))
}
