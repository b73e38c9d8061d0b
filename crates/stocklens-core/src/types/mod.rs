//! Core data types.

mod ohlcv;
mod signal;

pub use ohlcv::{Bar, Fundamentals, PriceSeries};
pub use signal::{Bias, Signal, SignalKind};
