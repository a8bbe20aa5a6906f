//! BandScan Runner: scan orchestration, configuration, sweeps, export.
//!
//! This crate builds on `bandscan-core` to provide:
//! - TOML scan configuration with fingerprinting
//! - Period presets resolved against a clock
//! - Single-scan runner (buffered fetch, trim, filter, evaluate)
//! - Summary metrics for the displayed window
//! - Volume-multiplier sweep
//! - JSON, CSV and Markdown export

pub mod config;
pub mod export;
pub mod period;
pub mod runner;
pub mod summary;
pub mod sweep;

pub use config::{ConfigError, ConfigId, ScanConfig, DEFAULT_BUFFER_DAYS};
pub use period::{DateRange, PeriodPreset};
pub use runner::{
    analyze_window, load_window, run_scan, LoadedWindow, ScanError, ScanOutcome, ScanReport,
    ScanRequest, SignalRecord, SCHEMA_VERSION,
};
pub use summary::{period_return, ScanSummary};
pub use sweep::{run_sweep, sweep_window, MultiplierGrid, SweepPoint, SweepReport, MAX_GRID_POINTS};
