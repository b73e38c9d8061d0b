//! Technical signal types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional bias implied by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bias::Bullish => write!(f, "bullish"),
            Bias::Bearish => write!(f, "bearish"),
            Bias::Neutral => write!(f, "neutral"),
        }
    }
}

/// Which indicator condition produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalKind {
    /// MACD crossed above its signal line
    GoldenCross,
    /// MACD crossed below its signal line
    DeathCross,
    /// RSI above the overbought threshold
    RsiOverbought { rsi: f64 },
    /// RSI below the oversold threshold
    RsiOversold { rsi: f64 },
}

impl SignalKind {
    /// Bias implied by this kind of signal.
    pub fn bias(&self) -> Bias {
        match self {
            SignalKind::GoldenCross | SignalKind::RsiOversold { .. } => Bias::Bullish,
            SignalKind::DeathCross | SignalKind::RsiOverbought { .. } => Bias::Bearish,
        }
    }

    /// Human readable label.
    pub fn label(&self) -> String {
        match self {
            SignalKind::GoldenCross => "MACD golden cross".to_string(),
            SignalKind::DeathCross => "MACD death cross".to_string(),
            SignalKind::RsiOverbought { rsi } => format!("RSI overbought ({:.1})", rsi),
            SignalKind::RsiOversold { rsi } => format!("RSI oversold ({:.1})", rsi),
        }
    }
}

/// A labelled technical signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub label: String,
    pub bias: Bias,
}

impl Signal {
    pub fn new(kind: SignalKind) -> Self {
        Self {
            label: kind.label(),
            bias: kind.bias(),
            kind,
        }
    }
}

impl From<SignalKind> for Signal {
    fn from(kind: SignalKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.label, self.bias)
    }
}
