//! Domain types: bars, series, symbols.

pub mod bar;
pub mod series;
pub mod symbol;

pub use bar::{BarError, PriceBar, VOLUME_LOT_SIZE};
pub use series::{CanonicalizeReport, PriceSeries, SeriesError};
pub use symbol::{normalize_symbol, Market, SymbolError, Ticker};
