//! Serializable scan configuration (TOML).
//!
//! Every field has a default, so an empty file is a valid configuration that
//! scans 2330.TW over the last year with the standard 20/2 bands.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bandscan_core::domain::SymbolError;
use bandscan_core::evaluation::DEFAULT_HORIZONS;
use bandscan_core::indicators::{IndicatorParams, ParamsError};
use bandscan_core::signals::{CriteriaError, SignalCriteria};

use crate::period::{DateRange, PeriodPreset};
use crate::runner::ScanRequest;

pub const DEFAULT_BUFFER_DAYS: u32 = 60;
pub const DEFAULT_SYMBOL: &str = "2330";

/// Deterministic identifier of a configuration (BLAKE3 hex digest).
pub type ConfigId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown period preset '{0}' (expected last_year, last_3_years, last_5_years, ai_boom, pandemic, trade_war or custom)")]
    UnknownPeriod(String),

    #[error("custom period requires both start_date and end_date")]
    MissingCustomDates,

    #[error("at least one evaluation horizon is required")]
    NoHorizons,

    #[error("invalid symbol: {0}")]
    Symbol(#[from] SymbolError),

    #[error("invalid indicator parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("invalid signal criteria: {0}")]
    Criteria(#[from] CriteriaError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSection {
    pub symbol: String,
    /// Preset name, or `custom` to use `start_date`/`end_date`.
    pub period: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Calendar days fetched before the display start for indicator warm-up.
    pub buffer_days: u32,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            period: PeriodPreset::LastYear.name().to_string(),
            start_date: None,
            end_date: None,
            buffer_days: DEFAULT_BUFFER_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSection {
    /// Holding horizons in trading bars.
    pub horizons: Vec<usize>,
}

impl Default for EvaluationSection {
    fn default() -> Self {
        Self {
            horizons: DEFAULT_HORIZONS.to_vec(),
        }
    }
}

/// Full configuration of one scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub scan: ScanSection,
    pub indicators: IndicatorParams,
    pub signal: SignalCriteria,
    pub evaluation: EvaluationSection,
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn period(&self) -> Result<PeriodPreset, ConfigError> {
        if self.scan.period.trim().eq_ignore_ascii_case("custom") {
            return match (self.scan.start_date, self.scan.end_date) {
                (Some(start), Some(end)) => Ok(PeriodPreset::Custom { start, end }),
                _ => Err(ConfigError::MissingCustomDates),
            };
        }
        self.scan.period.parse()
    }

    /// Check everything that can be checked without a clock or a provider.
    pub fn validate(&self) -> Result<(), ConfigError> {
        bandscan_core::domain::normalize_symbol(&self.scan.symbol)?;
        self.period()?;
        self.indicators.validate()?;
        self.signal.validate()?;
        if self.evaluation.horizons.is_empty() {
            return Err(ConfigError::NoHorizons);
        }
        Ok(())
    }

    /// Resolve into a runnable request, with relative periods anchored at `today`.
    pub fn to_request(&self, today: NaiveDate) -> Result<ScanRequest, ConfigError> {
        self.validate()?;
        let range: DateRange = self.period()?.resolve(today);
        Ok(ScanRequest {
            symbol: self.scan.symbol.clone(),
            range,
            buffer_days: self.scan.buffer_days,
            params: self.indicators,
            criteria: self.signal,
            horizons: self.evaluation.horizons.clone(),
        })
    }

    /// BLAKE3 hash of the canonical JSON form.
    ///
    /// Two configurations that scan the same thing share an id.
    pub fn fingerprint(&self) -> ConfigId {
        let json = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}
