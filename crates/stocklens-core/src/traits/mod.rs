//! Core traits.

mod data_source;
mod indicator;

pub use data_source::PriceSource;
pub use indicator::{BarIndicator, Indicator};
