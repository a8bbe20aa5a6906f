//! Named analysis periods and their resolution to concrete date ranges.
//!
//! End dates are exclusive, matching the provider contract: a range
//! `[2020-01-01, 2022-12-31)` covers sessions up to and including 2022-12-30.
//! Presets that run "until today" end on tomorrow so today's session is in.

use chrono::{Days, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Half-open calendar range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Calendar days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Same end, start moved `days` calendar days earlier.
    /// `None` when that falls before the earliest representable date.
    pub fn with_buffer(&self, days: u32) -> Option<Self> {
        let start = self.start.checked_sub_days(Days::new(u64::from(days)))?;
        Some(Self {
            start,
            end: self.end,
        })
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Preset analysis windows offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodPreset {
    LastYear,
    Last3Years,
    Last5Years,
    /// 2023-01-01 until today.
    AiBoom,
    /// 2020-01-01 until 2022-12-31.
    Pandemic,
    /// 2018-01-01 until 2020-01-15.
    TradeWar,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl PeriodPreset {
    /// Every named preset, in display order.
    pub const NAMED: [PeriodPreset; 6] = [
        PeriodPreset::LastYear,
        PeriodPreset::Last3Years,
        PeriodPreset::Last5Years,
        PeriodPreset::AiBoom,
        PeriodPreset::Pandemic,
        PeriodPreset::TradeWar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PeriodPreset::LastYear => "last_year",
            PeriodPreset::Last3Years => "last_3_years",
            PeriodPreset::Last5Years => "last_5_years",
            PeriodPreset::AiBoom => "ai_boom",
            PeriodPreset::Pandemic => "pandemic",
            PeriodPreset::TradeWar => "trade_war",
            PeriodPreset::Custom { .. } => "custom",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PeriodPreset::LastYear => "Last 365 days",
            PeriodPreset::Last3Years => "Last 3 years",
            PeriodPreset::Last5Years => "Last 5 years",
            PeriodPreset::AiBoom => "AI boom (2023 onward)",
            PeriodPreset::Pandemic => "Pandemic (2020-2022)",
            PeriodPreset::TradeWar => "US-China trade war (2018-2019)",
            PeriodPreset::Custom { .. } => "Custom range",
        }
    }

    /// Concrete range relative to `today`; open-ended presets include `today`.
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        let through_today = today.succ_opt().unwrap_or(today);
        let days_back = |days: i64| DateRange::new(today - Duration::days(days), through_today);
        match *self {
            PeriodPreset::LastYear => days_back(365),
            PeriodPreset::Last3Years => days_back(3 * 365),
            PeriodPreset::Last5Years => days_back(5 * 365),
            PeriodPreset::AiBoom => DateRange::new(ymd(2023, 1, 1), through_today),
            PeriodPreset::Pandemic => DateRange::new(ymd(2020, 1, 1), ymd(2022, 12, 31)),
            PeriodPreset::TradeWar => DateRange::new(ymd(2018, 1, 1), ymd(2020, 1, 15)),
            PeriodPreset::Custom { start, end } => DateRange::new(start, end),
        }
    }
}

// Only called with literal calendar dates.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

impl std::fmt::Display for PeriodPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the named presets; `custom` needs dates and is built directly.
impl std::str::FromStr for PeriodPreset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::NAMED
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| ConfigError::UnknownPeriod(s.to_string()))
    }
}
