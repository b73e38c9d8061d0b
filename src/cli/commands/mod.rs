//! CLI command implementations.

pub mod backtest;
pub mod market;
pub mod report;
pub mod validate;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use stocklens_analysis::{Analyzer, AnalyzerSettings, BacktestWindow};
use stocklens_config::{AppConfig, DataProvider};
use stocklens_core::traits::PriceSource;
use stocklens_data::{CsvSource, RetryPolicy, RetryingSource, YahooConfig, YahooSource};
use tracing::info;

/// Build the configured price source, wrapped with retries.
///
/// `fundamentals` asks the Yahoo source for the quote-summary lookup on top
/// of the chart request.
pub fn build_source(config: &AppConfig, fundamentals: bool) -> Result<Arc<dyn PriceSource>> {
    let data = &config.data;
    let policy = RetryPolicy::new(
        data.max_retries,
        Duration::from_millis(data.retry_base_delay_ms),
    );

    let source: Arc<dyn PriceSource> = match data.provider {
        DataProvider::Yahoo => {
            let yahoo = YahooSource::new(YahooConfig {
                base_url: data.base_url.clone(),
                timezone: data.timezone()?,
                timeout: Duration::from_secs(data.timeout_secs),
                fetch_fundamentals: fundamentals,
            })
            .context("Failed to create Yahoo source")?;
            Arc::new(RetryingSource::new(yahoo, policy))
        }
        DataProvider::Csv => {
            let csv = CsvSource::new(&data.csv_dir).with_context(|| {
                format!("Failed to open CSV directory {}", data.csv_dir.display())
            })?;
            Arc::new(RetryingSource::new(csv, policy))
        }
    };

    info!("Using {} price source", source.name());
    Ok(source)
}

/// Build an analyzer over the configured source.
pub fn build_analyzer(config: &AppConfig, fundamentals: bool) -> Result<Analyzer> {
    let settings = AnalyzerSettings {
        report_window: config.analysis.report_window,
        report_lookback_days: config.analysis.report_lookback_days,
        backtest_window: BacktestWindow {
            lookback_days: config.analysis.backtest_lookback_days,
            lookahead_days: config.analysis.backtest_lookahead_days,
        },
        timezone: config.data.timezone()?,
    };
    Ok(Analyzer::new(build_source(config, fundamentals)?, settings))
}

/// Write a result as pretty JSON.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Results saved to {}", path.display());
    Ok(())
}
