//! Indicator traits.

use crate::types::Bar;

/// Indicator over one value stream, usually closes or volumes.
pub trait Indicator: Send + Sync {
    type Output;

    /// Full output series for `data`, oldest first. Shorter than `data` when
    /// the indicator needs a warmup.
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    fn name(&self) -> &str;
}

/// Indicator that reads whole bars and yields a single reading for the
/// latest one.
pub trait BarIndicator: Send + Sync {
    type Output;

    /// Evaluate over `bars`, oldest first.
    fn evaluate(&self, bars: &[Bar]) -> Self::Output;

    fn name(&self) -> &str;
}
