//! Volume anomaly detection.

use serde::{Deserialize, Serialize};
use std::fmt;
use stocklens_core::traits::BarIndicator;
use stocklens_core::types::Bar;

use crate::moving_average::Sma;

/// Verdict on the latest bar's volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VolumeAlert {
    #[serde(rename = "Volume breakout: latest volume exceeds 2x the 5-day average")]
    Breakout,
    #[serde(rename = "Thin trading: latest volume below half the 5-day average")]
    Thin,
    #[serde(rename = "Volume within normal range")]
    Normal,
}

impl VolumeAlert {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolumeAlert::Breakout => "Volume breakout: latest volume exceeds 2x the 5-day average",
            VolumeAlert::Thin => "Thin trading: latest volume below half the 5-day average",
            VolumeAlert::Normal => "Volume within normal range",
        }
    }
}

impl fmt::Display for VolumeAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares the latest volume with its trailing rolling mean.
///
/// The mean includes the latest bar. With fewer bars than the window the
/// mean covers whatever is available.
#[derive(Debug, Clone)]
pub struct AbnormalVolume {
    window: Sma,
    breakout_ratio: f64,
    thin_ratio: f64,
}

impl AbnormalVolume {
    /// Detector with the default parameters (5 bars, 2x breakout, 0.5x thin).
    pub fn new() -> Self {
        Self::with_params(5, 2.0, 0.5)
    }

    pub fn with_params(window: usize, breakout_ratio: f64, thin_ratio: f64) -> Self {
        assert!(
            breakout_ratio > thin_ratio,
            "Breakout ratio must exceed thin ratio"
        );
        Self {
            window: Sma::new(window),
            breakout_ratio,
            thin_ratio,
        }
    }

    /// Classify a volume series, oldest first.
    pub fn assess(&self, volumes: &[f64]) -> VolumeAlert {
        let (Some(&latest), Some(mean)) = (volumes.last(), self.window.trailing(volumes)) else {
            return VolumeAlert::Normal;
        };

        if latest > mean * self.breakout_ratio {
            VolumeAlert::Breakout
        } else if latest < mean * self.thin_ratio {
            VolumeAlert::Thin
        } else {
            VolumeAlert::Normal
        }
    }
}

impl Default for AbnormalVolume {
    fn default() -> Self {
        Self::new()
    }
}

impl BarIndicator for AbnormalVolume {
    type Output = VolumeAlert;

    fn evaluate(&self, bars: &[Bar]) -> VolumeAlert {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        self.assess(&volumes)
    }

    fn name(&self) -> &str {
        "AbnormalVolume"
    }
}
