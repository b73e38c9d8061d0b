//! Price history sources for stocklens.
//!
//! - [`YahooSource`]: daily bars from the Yahoo Finance chart API
//! - [`CsvSource`]: daily bars from a directory of CSV exports
//! - [`RetryingSource`]: retries transient failures of any source

mod csv_source;
mod retry;
mod yahoo;

pub use csv_source::CsvSource;
pub use retry::{RetryPolicy, RetryingSource};
pub use yahoo::{YahooConfig, YahooSource};
