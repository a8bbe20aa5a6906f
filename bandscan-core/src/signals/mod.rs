//! Signal filter: volume surge with an optional price-vs-band condition.

pub mod criteria;
pub mod filter;

pub use criteria::{BandMode, CriteriaError, SignalCriteria, DEFAULT_VOLUME_MULTIPLIER};
pub use filter::{
    filter_signals, qualifies, signal_dates, trigger_price, FilterError, Signal, MARKER_OFFSET,
};
