//! Fixtures shared by the unit tests of this crate.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use stocklens_core::error::DataError;
use stocklens_core::traits::PriceSource;
use stocklens_core::types::{Bar, PriceSeries};

/// 2024-01-01 plus `offset` calendar days.
pub(crate) fn day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset as i64)
}

/// Consecutive daily bars with open = close and a +/- 1 range.
pub(crate) fn series(symbol: &str, closes: &[f64], volumes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&c, &v))| Bar::new(day(i as u32), c, c + 1.0, (c - 1.0).max(0.0), c, v))
        .collect();
    PriceSeries::new(symbol, bars).unwrap()
}

pub(crate) fn series_from_closes(symbol: &str, closes: &[f64]) -> PriceSeries {
    series(symbol, closes, &vec![1_000_000.0; closes.len()])
}

/// In-memory source that records the ranges it was asked for.
pub(crate) struct MockSource {
    bars: Vec<Bar>,
    fail_with: Option<fn() -> DataError>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl MockSource {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            fail_with: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: fn() -> DataError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait]
impl PriceSource for MockSource {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((symbol.to_string(), start, end));

        if let Some(error) = self.fail_with {
            return Err(error());
        }

        let bars = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date < end)
            .copied()
            .collect();
        PriceSeries::new(symbol, bars)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
