//! Price history source trait.

use crate::error::DataError;
use crate::types::PriceSeries;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Trait for daily price history sources.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch daily bars and fundamentals.
    ///
    /// # Arguments
    /// * `symbol` - The symbol to fetch
    /// * `start` - First calendar date of the range (inclusive)
    /// * `end` - Last calendar date of the range (exclusive)
    ///
    /// # Returns
    /// A series ordered from oldest to newest. An empty series is a valid
    /// answer; transient failures are reported as errors for the caller to retry.
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError>;

    /// Get the source name.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Bar;
    use std::sync::Arc;

    struct FixedSource {
        bars: Vec<Bar>,
    }

    #[async_trait]
    impl PriceSource for FixedSource {
        async fn fetch(
            &self,
            symbol: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<PriceSeries, DataError> {
            let bars = self
                .bars
                .iter()
                .filter(|b| b.date >= start && b.date < end)
                .copied()
                .collect();
            PriceSeries::new(symbol, bars)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_source_behind_dyn_handle() {
        let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        let source: Arc<dyn PriceSource> = Arc::new(FixedSource {
            bars: (1..=5)
                .map(|i| Bar::new(d(i), 1.0, 1.0, 1.0, 1.0, 1.0))
                .collect(),
        });

        let series = source.fetch("TEST", d(2), d(4)).await.unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol(), "TEST");
        assert_eq!(source.name(), "fixed");
    }
}
