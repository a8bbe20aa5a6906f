//! Performance evaluator: fixed-horizon forward returns after each signal.

pub mod forward;

pub use forward::{
    evaluate_forward_returns, forward_return, forward_returns, HorizonStats, PerformanceReport,
    DEFAULT_HORIZONS,
};
