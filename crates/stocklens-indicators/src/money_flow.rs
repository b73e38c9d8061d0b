//! Money flow analysis.
//!
//! Combines the latest price and volume moves with a Money Flow Index and an
//! on-balance-volume trend into one of a fixed set of flow labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use stocklens_core::traits::BarIndicator;
use stocklens_core::types::Bar;

/// The four readings the classification chain looks at.
///
/// `None` marks a reading that could not be resolved (not enough bars or a
/// zero denominator). Any unresolved reading makes the whole window neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowInputs {
    /// Latest close vs previous close, percent
    pub price_change: Option<f64>,
    /// Latest volume vs previous volume, percent
    pub volume_change: Option<f64>,
    /// Money Flow Index
    pub mfi: Option<f64>,
    /// Three-bar OBV move relative to the mean absolute OBV, percent
    pub obv_change: Option<f64>,
}

/// Money flow classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoneyFlowLabel {
    #[serde(rename = "strong bullish surge")]
    StrongBullishSurge,
    #[serde(rename = "accelerating inflow — bullish")]
    AcceleratingInflow,
    #[serde(rename = "accelerating outflow — bearish")]
    AcceleratingOutflow,
    #[serde(rename = "sustained outflow — caution")]
    SustainedOutflow,
    #[serde(rename = "outflow warning — profit taking")]
    OutflowWarning,
    #[serde(rename = "inflow signal — accumulation at lows")]
    InflowSignal,
    #[serde(rename = "sustained inflow — bulls in control")]
    SustainedInflow,
    #[serde(rename = "gradual outflow — bears in control")]
    GradualOutflow,
    #[serde(rename = "minor inflow — short-term bullish")]
    MinorInflow,
    #[serde(rename = "minor outflow — short-term caution")]
    MinorOutflow,
    #[serde(rename = "flow neutral — awaiting signal")]
    Neutral,
}

impl MoneyFlowLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoneyFlowLabel::StrongBullishSurge => "strong bullish surge",
            MoneyFlowLabel::AcceleratingInflow => "accelerating inflow — bullish",
            MoneyFlowLabel::AcceleratingOutflow => "accelerating outflow — bearish",
            MoneyFlowLabel::SustainedOutflow => "sustained outflow — caution",
            MoneyFlowLabel::OutflowWarning => "outflow warning — profit taking",
            MoneyFlowLabel::InflowSignal => "inflow signal — accumulation at lows",
            MoneyFlowLabel::SustainedInflow => "sustained inflow — bulls in control",
            MoneyFlowLabel::GradualOutflow => "gradual outflow — bears in control",
            MoneyFlowLabel::MinorInflow => "minor inflow — short-term bullish",
            MoneyFlowLabel::MinorOutflow => "minor outflow — short-term caution",
            MoneyFlowLabel::Neutral => "flow neutral — awaiting signal",
        }
    }
}

impl fmt::Display for MoneyFlowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify flow readings. The first matching rule wins; an unresolved
/// reading short-circuits to [`MoneyFlowLabel::Neutral`].
pub fn classify(inputs: &FlowInputs) -> MoneyFlowLabel {
    let (Some(price), Some(volume), Some(mfi), Some(obv)) = (
        inputs.price_change,
        inputs.volume_change,
        inputs.mfi,
        inputs.obv_change,
    ) else {
        return MoneyFlowLabel::Neutral;
    };

    if price > 2.0 && volume > 30.0 && obv > 3.0 {
        if mfi > 70.0 {
            MoneyFlowLabel::StrongBullishSurge
        } else {
            MoneyFlowLabel::AcceleratingInflow
        }
    } else if price < -2.0 && volume > 30.0 && obv < -3.0 {
        if mfi < 30.0 {
            MoneyFlowLabel::AcceleratingOutflow
        } else {
            MoneyFlowLabel::SustainedOutflow
        }
    } else if mfi > 70.0 && obv < -3.0 {
        MoneyFlowLabel::OutflowWarning
    } else if mfi < 30.0 && obv > 3.0 {
        MoneyFlowLabel::InflowSignal
    } else if mfi > 55.0 && obv > 2.0 {
        MoneyFlowLabel::SustainedInflow
    } else if mfi < 45.0 && obv < -2.0 {
        MoneyFlowLabel::GradualOutflow
    } else if price > 0.5 && volume > 10.0 {
        MoneyFlowLabel::MinorInflow
    } else if price < -0.5 && volume > 10.0 {
        MoneyFlowLabel::MinorOutflow
    } else {
        MoneyFlowLabel::Neutral
    }
}

/// Percent change of the last value against the one before it.
fn last_change_pct(values: &[f64]) -> Option<f64> {
    let [.., prev, last] = values else {
        return None;
    };
    if *prev == 0.0 {
        return None;
    }
    Some((last - prev) / prev * 100.0)
}

/// Money flow indicator over a bar window.
#[derive(Debug, Clone)]
pub struct MoneyFlow {
    mfi_period: usize,
    obv_lag: usize,
}

impl MoneyFlow {
    /// Defaults: 10-bar MFI, 3-bar OBV difference.
    pub fn new() -> Self {
        Self::with_params(10, 3)
    }

    pub fn with_params(mfi_period: usize, obv_lag: usize) -> Self {
        assert!(mfi_period > 0, "MFI period must be greater than 0");
        assert!(obv_lag > 0, "OBV lag must be greater than 0");
        Self {
            mfi_period,
            obv_lag,
        }
    }

    /// Money Flow Index over the trailing `mfi_period` bars.
    ///
    /// A bar adds its raw flow to the positive side when its typical price
    /// rose against the prior bar and to the negative side when it fell. The
    /// first bar of the series has no prior bar and adds nothing.
    pub fn mfi(&self, bars: &[Bar]) -> Option<f64> {
        let start = bars.len().saturating_sub(self.mfi_period).max(1);

        let mut positive = 0.0;
        let mut negative = 0.0;
        for i in start..bars.len() {
            let typical = bars[i].typical_price();
            let prev = bars[i - 1].typical_price();
            if typical > prev {
                positive += bars[i].raw_money_flow();
            } else if typical < prev {
                negative += bars[i].raw_money_flow();
            }
        }

        if negative == 0.0 {
            return None;
        }
        Some(100.0 - 100.0 / (1.0 + positive / negative))
    }

    /// Cumulative signed volume. The first bar counts as an up bar.
    pub fn obv(bars: &[Bar]) -> Vec<f64> {
        let mut total = 0.0;
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let up = i == 0 || bar.close > bars[i - 1].close;
                total += if up { bar.volume } else { -bar.volume };
                total
            })
            .collect()
    }

    /// OBV move over `obv_lag` bars, normalized by the mean absolute OBV.
    pub fn obv_change(&self, bars: &[Bar]) -> Option<f64> {
        let obv = Self::obv(bars);
        if obv.len() <= self.obv_lag {
            return None;
        }

        let mean_abs = obv.iter().map(|v| v.abs()).sum::<f64>() / obv.len() as f64;
        if mean_abs == 0.0 {
            return None;
        }

        let last = obv[obv.len() - 1];
        let lagged = obv[obv.len() - 1 - self.obv_lag];
        Some((last - lagged) / mean_abs * 100.0)
    }

    /// All four classification inputs for the window.
    pub fn inputs(&self, bars: &[Bar]) -> FlowInputs {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        FlowInputs {
            price_change: last_change_pct(&closes),
            volume_change: last_change_pct(&volumes),
            mfi: self.mfi(bars),
            obv_change: self.obv_change(bars),
        }
    }
}

impl Default for MoneyFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl BarIndicator for MoneyFlow {
    type Output = MoneyFlowLabel;

    fn evaluate(&self, bars: &[Bar]) -> MoneyFlowLabel {
        classify(&self.inputs(bars))
    }

    fn name(&self) -> &str {
        "MoneyFlow"
    }
}
