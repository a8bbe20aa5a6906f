//! Signal criteria: the user-tunable predicate configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_VOLUME_MULTIPLIER: f64 = 1.5;

/// Which price-vs-band condition augments the volume surge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandMode {
    /// Volume surge only.
    #[default]
    None,
    /// Close at or above `bb_high * (1 - tolerance)`.
    NearUpper,
    /// Close at or below `bb_low * (1 + tolerance)`.
    NearLower,
}

impl BandMode {
    pub fn as_str(self) -> &'static str {
        match self {
            BandMode::None => "none",
            BandMode::NearUpper => "near_upper",
            BandMode::NearLower => "near_lower",
        }
    }
}

impl std::fmt::Display for BandMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BandMode {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(BandMode::None),
            "near_upper" | "upper" => Ok(BandMode::NearUpper),
            "near_lower" | "lower" => Ok(BandMode::NearLower),
            other => Err(CriteriaError::UnknownBandMode(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CriteriaError {
    #[error("volume_multiplier must be finite and >= 1.0, got {0}")]
    InvalidVolumeMultiplier(f64),

    #[error("tolerance_pct must be finite and >= 0, got {0}")]
    InvalidTolerance(f64),

    #[error("unknown band mode '{0}' (expected none, near_upper, near_lower)")]
    UnknownBandMode(String),
}

/// Immutable per-run signal configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalCriteria {
    /// Volume must exceed `vol_ma * volume_multiplier`.
    pub volume_multiplier: f64,
    pub band_mode: BandMode,
    /// Percentage slack on the band boundary (1.0 = 1%).
    pub tolerance_pct: f64,
}

impl Default for SignalCriteria {
    fn default() -> Self {
        Self {
            volume_multiplier: DEFAULT_VOLUME_MULTIPLIER,
            band_mode: BandMode::None,
            tolerance_pct: 0.0,
        }
    }
}

impl SignalCriteria {
    pub fn volume_only(volume_multiplier: f64) -> Self {
        Self {
            volume_multiplier,
            ..Default::default()
        }
    }

    pub fn with_band(mut self, band_mode: BandMode, tolerance_pct: f64) -> Self {
        self.band_mode = band_mode;
        self.tolerance_pct = tolerance_pct;
        self
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        if !self.volume_multiplier.is_finite() || self.volume_multiplier < 1.0 {
            return Err(CriteriaError::InvalidVolumeMultiplier(self.volume_multiplier));
        }
        if !self.tolerance_pct.is_finite() || self.tolerance_pct < 0.0 {
            return Err(CriteriaError::InvalidTolerance(self.tolerance_pct));
        }
        Ok(())
    }

    /// Tolerance as a fraction.
    pub fn tolerance(&self) -> f64 {
        self.tolerance_pct / 100.0
    }
}
