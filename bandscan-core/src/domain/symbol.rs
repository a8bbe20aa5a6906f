//! Taiwan market symbol normalization.
//!
//! A bare numeric code (e.g. `2330`, `00878`, `00631L`) is assumed to trade on
//! the listed market and gets the `.TW` suffix. OTC securities must be given
//! with an explicit `.TWO`; the engine does not try to guess the market.
//! Anything else (`AAPL`, `^TWII`) is passed through unchanged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which Taiwan market a normalized symbol points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// Taiwan Stock Exchange, suffix `.TW`.
    Listed,
    /// Taipei Exchange (OTC), suffix `.TWO`.
    Otc,
    /// Not a Taiwan code; used verbatim.
    Other,
}

impl Market {
    pub fn suffix(self) -> &'static str {
        match self {
            Market::Listed => ".TW",
            Market::Otc => ".TWO",
            Market::Other => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("symbol is empty")]
    Empty,
}

/// A provider-ready ticker such as `2330.TW`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker {
    code: String,
    market: Market,
}

impl Ticker {
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn market(&self) -> Market {
        self.market
    }

    /// Same code on the other market. Used to suggest `.TWO` when `.TW` has no data.
    pub fn with_market(&self, market: Market) -> Self {
        Self {
            code: self.code.clone(),
            market,
        }
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.code, self.market.suffix())
    }
}

/// Normalize user input into a [`Ticker`].
///
/// Only codes starting with a digit get the default `.TW`; a code that
/// already carries `.TW` or `.TWO` keeps it.
pub fn normalize_symbol(input: &str) -> Result<Ticker, SymbolError> {
    let upper = input.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(SymbolError::Empty);
    }

    let (code, market) = if let Some(code) = upper.strip_suffix(".TWO") {
        (code, Market::Otc)
    } else if let Some(code) = upper.strip_suffix(".TW") {
        (code, Market::Listed)
    } else if upper.starts_with(|c: char| c.is_ascii_digit()) {
        (upper.as_str(), Market::Listed)
    } else {
        (upper.as_str(), Market::Other)
    };

    if code.is_empty() {
        return Err(SymbolError::Empty);
    }

    Ok(Ticker {
        code: code.to_string(),
        market,
    })
}
