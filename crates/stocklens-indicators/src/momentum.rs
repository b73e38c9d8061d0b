//! Momentum indicators.

use serde::{Deserialize, Serialize};
use stocklens_core::traits::Indicator;
use stocklens_core::types::{Signal, SignalKind};

use crate::moving_average::{Ema, Sma};

/// RSI level above which a series is overbought.
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// RSI level below which a series is oversold.
pub const RSI_OVERSOLD: f64 = 30.0;

/// Relative Strength Index (RSI).
///
/// Average gain over average loss across a rolling window of closes, using
/// plain means. The first close contributes a zero gain and a zero loss, so
/// the first value is available once `period` closes exist.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// RSI of the most recent window, if defined.
    pub fn latest(&self, closes: &[f64]) -> Option<f64> {
        self.calculate(closes).last().copied().flatten()
    }

    /// Overbought / oversold signal for an RSI reading.
    pub fn signal(value: f64) -> Option<Signal> {
        if value > RSI_OVERBOUGHT {
            Some(Signal::new(SignalKind::RsiOverbought { rsi: value }))
        } else if value < RSI_OVERSOLD {
            Some(Signal::new(SignalKind::RsiOversold { rsi: value }))
        } else {
            None
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(14)
    }
}

impl Indicator for Rsi {
    /// `None` for a window without any price movement.
    type Output = Option<f64>;

    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
        if data.len() < self.period {
            return vec![];
        }

        let mut gains = Vec::with_capacity(data.len());
        let mut losses = Vec::with_capacity(data.len());
        gains.push(0.0);
        losses.push(0.0);

        for pair in data.windows(2) {
            let change = pair[1] - pair[0];
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let sma = Sma::new(self.period);
        let avg_gains = sma.calculate(&gains);
        let avg_losses = sma.calculate(&losses);

        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(&gain, &loss)| {
                if loss == 0.0 {
                    if gain == 0.0 {
                        None
                    } else {
                        Some(100.0)
                    }
                } else {
                    let rsi = 100.0 - (100.0 / (1.0 + gain / loss));
                    Some(rsi.clamp(0.0, 100.0))
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }

    /// Crossover between the last two points of a MACD series.
    ///
    /// Golden cross: MACD moves from at-or-below the signal line to above it.
    /// Death cross: MACD moves from at-or-above the signal line to below it.
    pub fn crossover(outputs: &[MacdOutput]) -> Option<SignalKind> {
        let [prev, last] = outputs.get(outputs.len().checked_sub(2)?..)? else {
            return None;
        };

        if last.macd > last.signal && prev.macd <= prev.signal {
            Some(SignalKind::GoldenCross)
        } else if last.macd < last.signal && prev.macd >= prev.signal {
            Some(SignalKind::DeathCross)
        } else {
            None
        }
    }

    /// Crossover signal for a close series, if any.
    pub fn signal(&self, closes: &[f64]) -> Option<Signal> {
        Self::crossover(&self.calculate(closes)).map(Signal::new)
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn calculate(&self, data: &[f64]) -> Vec<MacdOutput> {
        let fast_ema = Ema::new(self.fast_period).calculate(data);
        let slow_ema = Ema::new(self.slow_period).calculate(data);

        let macd_line: Vec<f64> = fast_ema
            .iter()
            .zip(slow_ema.iter())
            .map(|(f, s)| f - s)
            .collect();

        let signal_line = Ema::new(self.signal_period).calculate(&macd_line);

        macd_line
            .iter()
            .zip(signal_line.iter())
            .map(|(&macd, &signal)| MacdOutput {
                macd,
                signal,
                histogram: macd - signal,
            })
            .collect()
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// MACD crossover followed by the RSI(14) reading, in that order.
pub fn technical_signals(closes: &[f64]) -> Vec<Signal> {
    let mut signals = Vec::new();

    if let Some(signal) = Macd::new().signal(closes) {
        signals.push(signal);
    }

    if let Some(signal) = Rsi::default().latest(closes).and_then(Rsi::signal) {
        signals.push(signal);
    }

    signals
}
