//! Point-in-time backtest of report signals.
//!
//! The report is rebuilt from the bars up to the test date only, then each
//! signal's implied direction is scored against the next trading day's close.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use stocklens_core::types::{PriceSeries, Signal, SignalKind};
use stocklens_core::{AnalysisError, AnalysisResult};
use tracing::{debug, info};

use crate::report::{Report, ReportGenerator};

/// Predicted direction of the next close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Golden crosses and oversold readings call for a rise; everything else for a fall.
    pub fn predicted_by(kind: &SignalKind) -> Self {
        match kind {
            SignalKind::GoldenCross | SignalKind::RsiOversold { .. } => Direction::Up,
            _ => Direction::Down,
        }
    }

    /// Whether the move from `from` to `to` agrees with this direction.
    pub fn matches(&self, from: f64, to: f64) -> bool {
        match self {
            Direction::Up => to > from,
            Direction::Down => to < from,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// One scored signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub signal: String,
    pub predicted: Direction,
    pub correct: bool,
}

/// What happened on the trading day after the test date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NextDayOutcome {
    pub date: NaiveDate,
    pub close: f64,
    /// Open-to-close move, percent
    pub change: f64,
}

/// Backtest output for one symbol and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub symbol: String,
    /// Date the caller asked for
    pub target_date: NaiveDate,
    /// Trading day the target resolved to
    pub test_date: NaiveDate,
    pub report: Report,
    pub next_day: NextDayOutcome,
    pub predictions: Vec<Prediction>,
    /// Percent of correct predictions, `None` without any signal
    pub accuracy: Option<f64>,
}

impl BacktestResult {
    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = self.report.summary();

        s.push_str("BACKTEST\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Requested Date:      {}\n", self.target_date));
        s.push_str(&format!("  Test Date:           {}\n", self.test_date));
        s.push_str(&format!("  Next Trading Day:    {}\n", self.next_day.date));
        s.push_str(&format!("  Next Close:          {:.2}\n", self.next_day.close));
        s.push_str(&format!("  Next Day Change:     {:+.2}%\n", self.next_day.change));
        s.push('\n');

        for p in &self.predictions {
            s.push_str(&format!(
                "  {:<32} {:<5} {}\n",
                p.signal,
                p.predicted,
                if p.correct { "correct" } else { "wrong" }
            ));
        }
        match self.accuracy {
            Some(acc) => s.push_str(&format!("  Accuracy:            {:.2}%\n", acc)),
            None => s.push_str("  Accuracy:            n/a (no signals)\n"),
        }
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Index of the trading date nearest to `target`.
///
/// When `target` sits exactly between two trading dates the later one wins.
/// `None` only for an empty index.
pub fn resolve_target_index(dates: &[NaiveDate], target: NaiveDate) -> Option<usize> {
    if dates.is_empty() {
        return None;
    }

    let right = dates.partition_point(|d| *d < target);
    if right == 0 {
        return Some(0);
    }
    if right == dates.len() {
        return Some(dates.len() - 1);
    }

    let left = right - 1;
    if target - dates[left] < dates[right] - target {
        Some(left)
    } else {
        Some(right)
    }
}

/// Calendar offsets of the backtest fetch window around the target date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacktestWindow {
    pub lookback_days: u32,
    pub lookahead_days: u32,
}

impl BacktestWindow {
    /// `[target - lookback, target + lookahead)` as a fetch range.
    pub fn range(&self, target: NaiveDate) -> (NaiveDate, NaiveDate) {
        (
            target - Duration::days(self.lookback_days as i64),
            target + Duration::days(self.lookahead_days as i64),
        )
    }
}

impl Default for BacktestWindow {
    fn default() -> Self {
        Self {
            lookback_days: 60,
            lookahead_days: 10,
        }
    }
}

/// Replays the report as of a past date and scores it.
#[derive(Debug, Clone)]
pub struct BacktestValidator {
    generator: ReportGenerator,
}

impl BacktestValidator {
    pub fn new() -> Self {
        Self::with_generator(ReportGenerator::unbounded())
    }

    pub fn with_generator(generator: ReportGenerator) -> Self {
        Self { generator }
    }

    /// Score the report for `target` against the following trading day.
    ///
    /// `series` is the extended window around the target; bars after the
    /// resolved test date never reach the report.
    pub fn validate(&self, series: &PriceSeries, target: NaiveDate) -> AnalysisResult<BacktestResult> {
        if series.is_empty() {
            return Err(AnalysisError::DataUnavailable {
                symbol: series.symbol().to_string(),
            });
        }
        if series.len() < ReportGenerator::MIN_BARS {
            return Err(AnalysisError::InsufficientData {
                required: ReportGenerator::MIN_BARS,
                available: series.len(),
            });
        }

        let dates = series.dates();
        let idx = resolve_target_index(&dates, target)
            .ok_or(AnalysisError::DateResolutionFailure { target })?;
        let test_date = dates[idx];
        debug!("{}: target {} resolved to {}", series.symbol(), target, test_date);

        let (Some(test_bar), Some(next_bar)) = (series.get(idx), series.get(idx + 1)) else {
            return Err(AnalysisError::NoSubsequentTradingDay { date: test_date });
        };

        let prefix = series
            .prefix(idx)
            .ok_or(AnalysisError::DateResolutionFailure { target })?;
        let report = self.generator.generate(&prefix)?;

        let change = next_bar.intraday_change_pct().ok_or_else(|| {
            AnalysisError::ComputeError(format!("zero open on {}", next_bar.date))
        })?;
        let next_day = NextDayOutcome {
            date: next_bar.date,
            close: next_bar.close,
            change,
        };

        let predictions = score(&report.technical_signals, test_bar.close, next_bar.close);
        let accuracy = accuracy(&predictions);

        info!(
            "Backtest {} on {}: {} signals, accuracy {:?}",
            series.symbol(),
            test_date,
            predictions.len(),
            accuracy
        );

        Ok(BacktestResult {
            symbol: series.symbol().to_string(),
            target_date: target,
            test_date,
            report,
            next_day,
            predictions,
            accuracy,
        })
    }
}

impl Default for BacktestValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn score(signals: &[Signal], test_close: f64, next_close: f64) -> Vec<Prediction> {
    signals
        .iter()
        .map(|signal| {
            let predicted = Direction::predicted_by(&signal.kind);
            Prediction {
                signal: signal.label.clone(),
                predicted,
                correct: predicted.matches(test_close, next_close),
            }
        })
        .collect()
}

fn accuracy(predictions: &[Prediction]) -> Option<f64> {
    if predictions.is_empty() {
        return None;
    }
    let correct = predictions.iter().filter(|p| p.correct).count();
    Some(correct as f64 / predictions.len() as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, series_from_closes};
    use stocklens_core::ErrorKind;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_resolve_exact_and_nearest() {
        // Thu, Fri, Mon
        let dates = [d(2024, 3, 7), d(2024, 3, 8), d(2024, 3, 11)];
        assert_eq!(resolve_target_index(&dates, d(2024, 3, 8)), Some(1));
        // Saturday is closer to Friday
        assert_eq!(resolve_target_index(&dates, d(2024, 3, 9)), Some(1));
        // Sunday is closer to Monday
        assert_eq!(resolve_target_index(&dates, d(2024, 3, 10)), Some(2));
        assert_eq!(resolve_target_index(&dates, d(2024, 1, 1)), Some(0));
        assert_eq!(resolve_target_index(&dates, d(2025, 1, 1)), Some(2));
        assert_eq!(resolve_target_index(&[], d(2024, 3, 8)), None);
    }

    #[test]
    fn test_resolve_tie_goes_to_later_date() {
        let dates = [d(2024, 3, 1), d(2024, 3, 5)];
        assert_eq!(resolve_target_index(&dates, d(2024, 3, 3)), Some(1));
    }

    #[test]
    fn test_window_range() {
        let (start, end) = BacktestWindow::default().range(d(2024, 3, 15));
        assert_eq!(start, d(2024, 1, 15));
        assert_eq!(end, d(2024, 3, 25));
    }

    #[test]
    fn test_direction_mapping() {
        assert_eq!(Direction::predicted_by(&SignalKind::GoldenCross), Direction::Up);
        assert_eq!(
            Direction::predicted_by(&SignalKind::RsiOversold { rsi: 20.0 }),
            Direction::Up
        );
        assert_eq!(Direction::predicted_by(&SignalKind::DeathCross), Direction::Down);
        assert_eq!(
            Direction::predicted_by(&SignalKind::RsiOverbought { rsi: 80.0 }),
            Direction::Down
        );
        assert!(Direction::Up.matches(10.0, 11.0));
        assert!(!Direction::Up.matches(10.0, 10.0));
        assert!(!Direction::Down.matches(10.0, 10.0));
    }

    #[test]
    fn test_last_bar_has_no_next_day() {
        let s = series_from_closes("AAPL", &[100.0, 101.0, 102.0]);
        let err = BacktestValidator::new().validate(&s, day(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSubsequentTradingDay);
        // a target past the end resolves to the last bar as well
        let err = BacktestValidator::new().validate(&s, day(30)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoSubsequentTradingDay);
    }

    #[test]
    fn test_empty_and_short_series() {
        let validator = BacktestValidator::new();
        let err = validator
            .validate(&PriceSeries::empty("AAPL"), day(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataUnavailable);

        let err = validator
            .validate(&series_from_closes("AAPL", &[100.0]), day(0))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn test_first_bar_target_is_insufficient() {
        // resolving to index 0 leaves a one-bar prefix
        let s = series_from_closes("AAPL", &[100.0, 101.0, 102.0]);
        let err = BacktestValidator::new().validate(&s, day(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn test_no_lookahead() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 0.5).collect();
        let base = series_from_closes("AAPL", &closes);

        // wildly different future bars must not change the report
        closes.extend([10.0, 500.0, 3.0, 700.0]);
        let extended = series_from_closes("AAPL", &closes);

        let validator = BacktestValidator::new();
        let target = day(25);
        let a = validator.validate(&base, target).unwrap();
        let b = validator.validate(&extended, target).unwrap();
        assert_eq!(a.report, b.report);
        assert_eq!(a.test_date, target);
        assert_eq!(a.next_day.date, day(26));
    }

    #[test]
    fn test_scoring_and_accuracy() {
        // long decline then a bounce gives a golden cross and an oversold RSI
        let mut closes: Vec<f64> = (0..40).map(|i| 200.0 - 3.0 * i as f64).collect();
        closes.push(closes[39] + 12.0);
        let test_close = closes[40];
        closes.push(test_close + 1.0);
        let s = series_from_closes("AAPL", &closes);

        let result = BacktestValidator::new().validate(&s, day(40)).unwrap();

        assert_eq!(result.test_date, day(40));
        assert_eq!(result.predictions.len(), 2);
        assert!(result
            .predictions
            .iter()
            .all(|p| p.predicted == Direction::Up && p.correct));
        assert_eq!(result.accuracy, Some(100.0));
        assert!((result.next_day.close - (test_close + 1.0)).abs() < f64::EPSILON);
        // open equals close in the fixture
        assert!(result.next_day.change.abs() < f64::EPSILON);
    }

    #[test]
    fn test_accuracy_undefined_without_signals() {
        // flat closes give neither a crossover nor an RSI reading
        let s = series_from_closes("AAPL", &[100.0; 20]);
        let result = BacktestValidator::new().validate(&s, day(10)).unwrap();
        assert!(result.predictions.is_empty());
        assert_eq!(result.accuracy, None);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["accuracy"].is_null());
    }

    #[test]
    fn test_accuracy_partial() {
        let predictions = vec![
            Prediction {
                signal: "MACD golden cross".into(),
                predicted: Direction::Up,
                correct: true,
            },
            Prediction {
                signal: "RSI overbought (75.0)".into(),
                predicted: Direction::Down,
                correct: false,
            },
        ];
        assert_eq!(accuracy(&predictions), Some(50.0));
    }
}
