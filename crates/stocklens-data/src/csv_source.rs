//! CSV price history source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use stocklens_core::error::DataError;
use stocklens_core::traits::PriceSource;
use stocklens_core::types::{Bar, PriceSeries};
use tracing::{debug, warn};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: Option<f64>,
    #[serde(alias = "High", alias = "high")]
    high: Option<f64>,
    #[serde(alias = "Low", alias = "low")]
    low: Option<f64>,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: Option<f64>,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: Option<f64>,
}

/// Reads `<dir>/<SYMBOL>.csv` files of daily bars.
///
/// Lower-case file names and a `_daily` suffix are also accepted.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    /// Create a new CSV source over a directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, DataError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(DataError::Internal(format!(
                "CSV directory does not exist: {}",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Locate the file for a symbol.
    fn path_for(&self, symbol: &str) -> Option<PathBuf> {
        let upper = symbol.to_uppercase();
        let lower = symbol.to_lowercase();
        [
            format!("{}.csv", upper),
            format!("{}.csv", lower),
            format!("{}_daily.csv", upper),
            format!("{}_daily.csv", lower),
        ]
        .into_iter()
        .map(|name| self.dir.join(name))
        .find(|path| path.is_file())
    }

    /// Load every complete row of a file, sorted by date.
    fn load_from_path(path: &Path) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut bars = Vec::new();
        let mut skipped = 0usize;

        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            let date = parse_date(&record.date)?;

            match (record.open, record.high, record.low, record.close) {
                (Some(open), Some(high), Some(low), Some(close)) => {
                    let volume = record.volume.unwrap_or(0.0);
                    bars.push(Bar::new(date, open, high, low, close, volume));
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("Skipped {} incomplete rows in {}", skipped, path.display());
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);

        Ok(bars)
    }
}

/// Parse the date formats commonly found in exported price files.
fn parse_date(date_str: &str) -> Result<NaiveDate, DataError> {
    const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(d);
        }
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.date_naive());
    }

    // Unix timestamp, milliseconds when longer than 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        let secs = if ts > 10_000_000_000 { ts / 1000 } else { ts };
        if let Some(dt) = DateTime::from_timestamp(secs, 0) {
            return Ok(dt.date_naive());
        }
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[async_trait]
impl PriceSource for CsvSource {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let path = self
            .path_for(symbol)
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;
        debug!("Reading {} from {}", symbol, path.display());

        let bars: Vec<Bar> = Self::load_from_path(&path)?
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect();

        PriceSeries::new(symbol.to_uppercase(), bars)
    }

    fn name(&self) -> &str {
        "csv"
    }
}
