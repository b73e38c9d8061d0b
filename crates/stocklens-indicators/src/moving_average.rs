//! Moving average indicators.

use stocklens_core::traits::Indicator;

/// Simple moving average.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Mean of the trailing `period` values, or of all values when fewer exist.
    pub fn trailing(&self, data: &[f64]) -> Option<f64> {
        if data.is_empty() {
            return None;
        }
        let window = &data[data.len().saturating_sub(self.period)..];
        Some(window.iter().sum::<f64>() / window.len() as f64)
    }
}

impl Indicator for Sma {
    type Output = f64;

    /// One mean per full window; empty until `period` values exist.
    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let n = self.period as f64;
        data.windows(self.period)
            .map(|w| w.iter().sum::<f64>() / n)
            .collect()
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Exponential Moving Average (EMA).
///
/// Recursive form seeded with the first observation:
/// `ema[0] = x[0]`, `ema[i] = x[i] * k + ema[i-1] * (1 - k)` with `k = 2 / (n + 1)`.
/// Every input point yields an output point.
#[derive(Debug, Clone)]
pub struct Ema {
    multiplier: f64,
}

impl Ema {
    /// Create a new EMA with the specified span.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self {
            multiplier: 2.0 / (period as f64 + 1.0),
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        let Some((&first, rest)) = data.split_first() else {
            return vec![];
        };

        let mut result = Vec::with_capacity(data.len());
        let one_minus_mult = 1.0 - self.multiplier;

        let mut ema = first;
        result.push(ema);
        for &price in rest {
            ema = price * self.multiplier + ema * one_minus_mult;
            result.push(ema);
        }

        result
    }

    fn name(&self) -> &str {
        "EMA"
    }
}
