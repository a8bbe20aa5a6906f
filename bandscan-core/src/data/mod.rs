//! Data providers: where daily bars come from.
//!
//! Every provider returns a canonical [`PriceSeries`](crate::domain::PriceSeries)
//! restricted to the requested half-open date range, or a [`DataError`].

pub mod csv_file;
pub mod memo;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_file::CsvProvider;
pub use memo::{MemoProvider, DEFAULT_TTL};
pub use provider::{DataError, DataProvider, DataSource, FetchResult};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
