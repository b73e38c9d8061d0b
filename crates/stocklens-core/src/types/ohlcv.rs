//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// One trading day's OHLCV record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading date in the exchange's local calendar
    pub date: NaiveDate,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Traded volume (shares)
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calculate the typical price (HLC average).
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Calculate the bar's range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Typical price weighted by volume.
    #[inline]
    pub fn raw_money_flow(&self) -> f64 {
        self.typical_price() * self.volume
    }

    /// Open-to-close move in percent, `None` when the open is zero.
    pub fn intraday_change_pct(&self) -> Option<f64> {
        if self.open == 0.0 {
            None
        } else {
            Some((self.close - self.open) / self.open * 100.0)
        }
    }

    fn check(&self) -> Result<(), DataError> {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(DataError::InvalidSeries(format!(
                "bar {} has a negative or non-finite price",
                self.date
            )));
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(DataError::InvalidSeries(format!(
                "bar {} has a negative or non-finite volume",
                self.date
            )));
        }
        Ok(())
    }
}

/// Coarse company fundamentals that accompany a price history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    pub sector: String,
    pub market_cap: f64,
    pub pe_ratio: f64,
    pub beta: f64,
    /// Dividend yield in percent
    pub dividend_yield: f64,
    pub debt_to_equity: f64,
}

impl Default for Fundamentals {
    fn default() -> Self {
        Self {
            sector: "N/A".to_string(),
            market_cap: 0.0,
            pe_ratio: 0.0,
            beta: 1.0,
            dividend_yield: 0.0,
            debt_to_equity: 0.0,
        }
    }
}

/// Ordered daily price history for one symbol.
///
/// Bars are strictly ascending by date with no duplicates, and every price
/// and volume is non-negative. The series is never mutated once built; slicing
/// produces a new series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
    /// Present only when the source looked them up
    fundamentals: Option<Fundamentals>,
}

impl PriceSeries {
    /// Build a series, validating the bar invariants.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataError> {
        for bar in &bars {
            bar.check()?;
        }
        if let Some(pair) = bars.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(DataError::InvalidSeries(format!(
                "bars out of order or duplicated at {}",
                pair[1].date
            )));
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
            fundamentals: None,
        })
    }

    /// Create an empty series.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
            fundamentals: None,
        }
    }

    /// Attach fundamentals.
    pub fn with_fundamentals(mut self, fundamentals: Fundamentals) -> Self {
        self.fundamentals = Some(fundamentals);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn fundamentals(&self) -> Option<&Fundamentals> {
        self.fundamentals.as_ref()
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Check if the series is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get all bars as a slice.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get a bar by index (0 = oldest).
    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Get the last N bars.
    pub fn last_n(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Series holding bars `0..=index`. `None` when the index is out of range.
    pub fn prefix(&self, index: usize) -> Option<PriceSeries> {
        if index >= self.bars.len() {
            return None;
        }
        Some(Self {
            symbol: self.symbol.clone(),
            bars: self.bars[..=index].to_vec(),
            fundamentals: self.fundamentals.clone(),
        })
    }

    /// Trading dates, oldest first.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Extract volumes as a vector.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Get an iterator over the bars.
    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }
}
