//! Retry wrapper for price sources.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;
use stocklens_core::error::DataError;
use stocklens_core::traits::PriceSource;
use stocklens_core::types::PriceSeries;
use tracing::warn;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// No retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Delay before retrying after `err`. A provider `Retry-After` hint is
    /// honored when it is longer than the backoff.
    pub fn delay_for(&self, attempt: u32, err: &DataError) -> Duration {
        let backoff = self.delay(attempt);
        match err {
            DataError::RateLimited {
                retry_after_secs: Some(secs),
            } => backoff.max(Duration::from_secs(*secs)),
            _ => backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Retries transient failures (rate limiting, connection errors) of the
/// wrapped source. Any other error is returned immediately.
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: PriceSource> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: PriceSource> PriceSource for RetryingSource<S> {
    async fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch(symbol, start, end).await {
                Ok(series) => return Ok(series),
                Err(e) if e.is_transient() && attempt < self.policy.max_retries => {
                    let delay = self.policy.delay_for(attempt, &e);
                    warn!(
                        "{} fetch for {} failed ({}), retry {}/{} in {:?}",
                        self.inner.name(),
                        symbol,
                        e,
                        attempt + 1,
                        self.policy.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails with the given error a fixed number of times, then succeeds.
    struct FlakySource {
        failures: u32,
        calls: AtomicU32,
        transient: bool,
    }

    impl FlakySource {
        fn new(failures: u32, transient: bool) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                transient,
            }
        }
    }

    #[async_trait]
    impl PriceSource for FlakySource {
        async fn fetch(
            &self,
            symbol: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<PriceSeries, DataError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(if self.transient {
                    DataError::RateLimited {
                        retry_after_secs: None,
                    }
                } else {
                    DataError::SymbolNotFound(symbol.to_string())
                });
            }
            Ok(PriceSeries::empty(symbol))
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
    }

    #[test]
    fn test_retry_after_hint() {
        let policy = RetryPolicy::new(3, Duration::from_millis(500));
        let limited = |secs| DataError::RateLimited {
            retry_after_secs: secs,
        };

        assert_eq!(policy.delay_for(0, &limited(Some(2))), Duration::from_secs(2));
        // backoff wins once it is longer than the hint
        assert_eq!(policy.delay_for(3, &limited(Some(2))), Duration::from_secs(4));
        assert_eq!(policy.delay_for(1, &limited(None)), Duration::from_secs(1));
        assert_eq!(
            policy.delay_for(0, &DataError::ConnectionError("reset".to_string())),
            Duration::from_millis(500)
        );
    }

    #[tokio::test]
    async fn test_recovers_from_transient_failures() {
        let (start, end) = range();
        let source = RetryingSource::new(FlakySource::new(2, true), fast_policy(3));

        assert!(source.fetch("AAPL", start, end).await.is_ok());
        assert_eq!(source.into_inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let (start, end) = range();
        let source = RetryingSource::new(FlakySource::new(10, true), fast_policy(2));

        let err = source.fetch("AAPL", start, end).await.unwrap_err();
        assert!(matches!(err, DataError::RateLimited { .. }));
        assert_eq!(source.into_inner().calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let (start, end) = range();
        let source = RetryingSource::new(FlakySource::new(1, false), fast_policy(5));

        let err = source.fetch("AAPL", start, end).await.unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound(_)));
        assert_eq!(source.into_inner().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_name_passes_through() {
        let source = RetryingSource::new(FlakySource::new(0, true), RetryPolicy::none());
        assert_eq!(source.name(), "flaky");
    }
}
