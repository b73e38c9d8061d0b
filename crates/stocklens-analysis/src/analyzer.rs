//! Entry point used by callers: fetches history and runs the engine.

use chrono::{Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stocklens_core::traits::PriceSource;
use stocklens_core::{AnalysisError, AnalysisResult};
use tracing::{info, warn};

use crate::report::{Report, ReportGenerator};
use crate::validator::{BacktestResult, BacktestValidator, BacktestWindow};

/// Analyzer settings.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Bars fed to the daily report
    pub report_window: usize,
    /// Calendar days fetched for the daily report
    pub report_lookback_days: u32,
    pub backtest_window: BacktestWindow,
    /// Exchange calendar that decides what "today" is
    pub timezone: Tz,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            report_window: 5,
            report_lookback_days: 7,
            backtest_window: BacktestWindow::default(),
            timezone: chrono_tz::America::New_York,
        }
    }
}

/// Backtest request as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestRequest {
    pub symbol: String,
    /// `YYYY-MM-DD`
    pub start: String,
    /// `YYYY-MM-DD`, also the backtest target
    pub end: String,
}

impl BacktestRequest {
    pub fn new(symbol: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    /// Check the request and return the parsed `(start, end)` dates.
    pub fn validate(&self) -> AnalysisResult<(NaiveDate, NaiveDate)> {
        if self.symbol.trim().is_empty() {
            return Err(AnalysisError::InvalidRequest("symbol is empty".to_string()));
        }

        let start = parse_date("start", &self.start)?;
        let end = parse_date("end", &self.end)?;
        if start > end {
            return Err(AnalysisError::InvalidRequest(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }

        Ok((start, end))
    }
}

fn parse_date(field: &str, value: &str) -> AnalysisResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AnalysisError::InvalidRequest(format!(
            "{} date '{}' is not in YYYY-MM-DD format",
            field, value
        ))
    })
}

/// Runs daily reports and backtests against a shared price source.
#[derive(Clone)]
pub struct Analyzer {
    source: Arc<dyn PriceSource>,
    settings: AnalyzerSettings,
    generator: ReportGenerator,
    validator: BacktestValidator,
}

impl Analyzer {
    /// Create a new analyzer.
    ///
    /// # Panics
    /// Panics if `settings.report_window` is 0.
    pub fn new(source: Arc<dyn PriceSource>, settings: AnalyzerSettings) -> Self {
        Self {
            generator: ReportGenerator::new(settings.report_window),
            validator: BacktestValidator::new(),
            source,
            settings,
        }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Current calendar date on the exchange.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.settings.timezone).date_naive()
    }

    /// Report for the most recent trading day.
    pub async fn daily_report(&self, symbol: &str) -> AnalysisResult<Report> {
        self.daily_report_as_of(symbol, self.today()).await
    }

    /// Report over the lookback window ending on `today` (inclusive).
    pub async fn daily_report_as_of(&self, symbol: &str, today: NaiveDate) -> AnalysisResult<Report> {
        let symbol = normalize_symbol(symbol)?;
        let end = today + Duration::days(1);
        let start = end - Duration::days(self.settings.report_lookback_days as i64);

        info!(
            "Fetching {} from {} ({} to {})",
            symbol,
            self.source.name(),
            start,
            end
        );
        let series = self.source.fetch(&symbol, start, end).await.map_err(|e| {
            warn!("Fetch failed for {}: {}", symbol, e);
            AnalysisError::from(e)
        })?;

        self.generator.generate(&series).map_err(|e| {
            warn!("Report for {} failed: {}", symbol, e);
            e
        })
    }

    /// Replay the report as of `request.end` and score it.
    pub async fn backtest(&self, request: &BacktestRequest) -> AnalysisResult<BacktestResult> {
        let (_, target) = request.validate()?;
        let symbol = normalize_symbol(&request.symbol)?;
        let (start, end) = self.settings.backtest_window.range(target);

        info!(
            "Backtesting {} on {} from {} ({} to {})",
            symbol,
            target,
            self.source.name(),
            start,
            end
        );
        let series = self.source.fetch(&symbol, start, end).await.map_err(|e| {
            warn!("Fetch failed for {}: {}", symbol, e);
            AnalysisError::from(e)
        })?;

        self.validator.validate(&series, target).map_err(|e| {
            warn!("Backtest for {} on {} failed: {}", symbol, target, e);
            e
        })
    }
}

fn normalize_symbol(symbol: &str) -> AnalysisResult<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(AnalysisError::InvalidRequest("symbol is empty".to_string()));
    }
    Ok(symbol.to_uppercase())
}
