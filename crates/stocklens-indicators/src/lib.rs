//! Technical indicators for daily stock analysis.
//!
//! This crate provides the pure computations behind a daily report:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD crossover)
//! - Volatility indicators (range ATR, volatility clustering)
//! - Volume anomaly detection
//! - Money flow classification (MFI, OBV)
//!
//! Every indicator is a deterministic function of its input slice and holds
//! no state between calls.

pub mod momentum;
pub mod money_flow;
pub mod moving_average;
pub mod volatility;
pub mod volume;

pub use momentum::{technical_signals, Macd, MacdOutput, Rsi};
pub use money_flow::{classify, FlowInputs, MoneyFlow, MoneyFlowLabel};
pub use moving_average::{Ema, Sma};
pub use volatility::{pct_returns, sample_std_dev, RangeAtr, VolatilityAlert, VolatilityCluster};
pub use volume::{AbnormalVolume, VolumeAlert};
