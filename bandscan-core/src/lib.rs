//! BandScan Core: daily bars, indicators, signal filter, forward-return evaluation.
//!
//! This crate holds the pure analysis pipeline:
//! - Domain types (bars, series, symbols)
//! - Bollinger Bands and the rolling volume average
//! - The volume-surge signal filter with optional band proximity
//! - Fixed-horizon forward-return aggregates
//! - Data providers (Yahoo Finance, CSV import, synthetic, memoized)

pub mod data;
pub mod domain;
pub mod evaluation;
pub mod indicators;
pub mod signals;
