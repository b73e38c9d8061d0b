//! Volatility indicators.

use serde::{Deserialize, Serialize};
use std::fmt;
use stocklens_core::traits::BarIndicator;
use stocklens_core::types::Bar;

/// Sample standard deviation (n - 1 denominator).
///
/// Returns `None` with fewer than two values.
pub fn sample_std_dev(data: &[f64]) -> Option<f64> {
    if data.len() < 2 {
        return None;
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
    Some(variance.sqrt())
}

/// Percent close-to-close returns, one per consecutive pair. A zero prior
/// close leaves that return unresolved but keeps its position.
pub fn pct_returns(closes: &[f64]) -> Vec<Option<f64>> {
    closes
        .windows(2)
        .map(|pair| (pair[0] != 0.0).then(|| (pair[1] - pair[0]) / pair[0] * 100.0))
        .collect()
}

/// Average True Range proxy.
///
/// Mean of the intraday high-low range over the evaluated bars. Gaps
/// against the previous close are not included.
#[derive(Debug, Clone, Default)]
pub struct RangeAtr;

impl RangeAtr {
    pub fn new() -> Self {
        Self
    }
}

impl BarIndicator for RangeAtr {
    type Output = Option<f64>;

    fn evaluate(&self, bars: &[Bar]) -> Option<f64> {
        if bars.is_empty() {
            return None;
        }
        Some(bars.iter().map(Bar::range).sum::<f64>() / bars.len() as f64)
    }

    fn name(&self) -> &str {
        "ATR"
    }
}

/// Volatility clustering verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolatilityAlert {
    #[serde(rename = "Volatility cluster alert: 3+ abnormal moves in the last 5 sessions")]
    Cluster,
    #[serde(rename = "Normal volatility")]
    Normal,
}

impl VolatilityAlert {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityAlert::Cluster => {
                "Volatility cluster alert: 3+ abnormal moves in the last 5 sessions"
            }
            VolatilityAlert::Normal => "Normal volatility",
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, VolatilityAlert::Cluster)
    }
}

impl fmt::Display for VolatilityAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Volatility clustering detector.
///
/// A return is abnormal when its absolute value exceeds `multiplier` times
/// the sample standard deviation of every return in the history. The
/// alert fires when at least `min_abnormal` of the last `lookback` returns
/// are abnormal.
#[derive(Debug, Clone)]
pub struct VolatilityCluster {
    lookback: usize,
    multiplier: f64,
    min_abnormal: usize,
}

impl VolatilityCluster {
    /// Detector with the default parameters (last 5 returns, 1.5x std, 3 hits).
    pub fn new() -> Self {
        Self::with_params(5, 1.5, 3)
    }

    pub fn with_params(lookback: usize, multiplier: f64, min_abnormal: usize) -> Self {
        assert!(lookback > 0, "Lookback must be greater than 0");
        assert!(multiplier > 0.0, "Multiplier must be positive");
        Self {
            lookback,
            multiplier,
            min_abnormal,
        }
    }

    /// Number of abnormal moves among the trailing returns, if a threshold exists.
    ///
    /// The threshold comes from the resolved returns only. An unresolved
    /// return still occupies its slot in the trailing window and is never
    /// abnormal.
    pub fn abnormal_count(&self, closes: &[f64]) -> Option<usize> {
        let returns = pct_returns(closes);
        let resolved: Vec<f64> = returns.iter().flatten().copied().collect();
        let threshold = sample_std_dev(&resolved)? * self.multiplier;

        let recent = &returns[returns.len().saturating_sub(self.lookback)..];
        Some(
            recent
                .iter()
                .flatten()
                .filter(|r| r.abs() > threshold)
                .count(),
        )
    }

    /// Classify a close series.
    pub fn assess(&self, closes: &[f64]) -> VolatilityAlert {
        match self.abnormal_count(closes) {
            Some(count) if count >= self.min_abnormal => VolatilityAlert::Cluster,
            _ => VolatilityAlert::Normal,
        }
    }
}

impl Default for VolatilityCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl BarIndicator for VolatilityCluster {
    type Output = VolatilityAlert;

    fn evaluate(&self, bars: &[Bar]) -> VolatilityAlert {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        self.assess(&closes)
    }

    fn name(&self) -> &str {
        "VolatilityCluster"
    }
}
