//! Report generation and point-in-time backtesting.
//!
//! - [`ReportGenerator`]: single-date report from the latest bars
//! - [`BacktestValidator`]: replays the report as of a past date and scores it
//! - [`Analyzer`]: fetches history from a [`PriceSource`](stocklens_core::traits::PriceSource) and runs both
//! - [`market_snapshot`]: latest session across a list of instruments

mod analyzer;
mod market;
mod report;
mod response;
mod validator;

#[cfg(test)]
mod test_support;

pub use analyzer::{Analyzer, AnalyzerSettings, BacktestRequest};
pub use market::{default_instruments, market_snapshot, Instrument, MarketQuote};
pub use report::{Report, ReportGenerator};
pub use response::AnalysisResponse;
pub use validator::{
    resolve_target_index, BacktestResult, BacktestValidator, BacktestWindow, Direction,
    NextDayOutcome, Prediction,
};
