//! Daily report generation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stocklens_core::traits::BarIndicator;
use stocklens_core::types::{Fundamentals, PriceSeries, Signal};
use stocklens_core::{AnalysisError, AnalysisResult};
use stocklens_indicators::{
    technical_signals, AbnormalVolume, MoneyFlow, MoneyFlowLabel, RangeAtr, VolatilityAlert,
    VolatilityCluster, VolumeAlert,
};
use tracing::debug;

/// Single-date analytic report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub symbol: String,
    /// Date of the latest bar in the evaluated window
    pub date: NaiveDate,
    /// Latest close
    pub price: f64,
    /// Percent change from the previous close
    pub change: f64,
    /// Latest volume in millions
    pub volume: f64,
    /// Mean high-low range over the window
    pub atr: f64,
    pub volume_alert: VolumeAlert,
    /// MACD crossover first, then RSI
    pub technical_signals: Vec<Signal>,
    pub volatility_alert: VolatilityAlert,
    pub money_flow: MoneyFlowLabel,
    /// Company fundamentals, when the source looked them up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundamentals: Option<Fundamentals>,
}

impl Report {
    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str(&format!(
            "              DAILY REPORT  {}  {}\n",
            self.symbol, self.date
        ));
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str("PRICE\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Close:               {:.2}\n", self.price));
        s.push_str(&format!("  Change:              {:+.2}%\n", self.change));
        s.push_str(&format!("  Volume:              {:.2}M\n", self.volume));
        s.push_str(&format!("  ATR:                 {:.2}\n", self.atr));
        s.push('\n');

        s.push_str("SIGNALS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        if self.technical_signals.is_empty() {
            s.push_str("  (none)\n");
        }
        for signal in &self.technical_signals {
            s.push_str(&format!("  {}\n", signal));
        }
        s.push('\n');

        s.push_str("ALERTS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Volume:              {}\n", self.volume_alert));
        s.push_str(&format!("  Volatility:          {}\n", self.volatility_alert));
        s.push_str(&format!("  Money Flow:          {}\n", self.money_flow));
        s.push('\n');

        if let Some(f) = &self.fundamentals {
            s.push_str("FUNDAMENTALS\n");
            s.push_str("───────────────────────────────────────────────────────────\n");
            s.push_str(&format!("  Sector:              {}\n", f.sector));
            s.push_str(&format!("  Market Cap:          {:.2}B\n", f.market_cap / 1e9));
            s.push_str(&format!("  P/E:                 {:.2}\n", f.pe_ratio));
            s.push_str(&format!("  Beta:                {:.2}\n", f.beta));
            s.push_str(&format!("  Dividend Yield:      {:.2}%\n", f.dividend_yield));
            s.push_str(&format!("  Debt/Equity:         {:.2}\n", f.debt_to_equity));
            s.push('\n');
        }

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builds a [`Report`] from the most recent bars of a series.
///
/// Every indicator sees the same window. `None` means the whole series.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    window: Option<usize>,
}

impl ReportGenerator {
    /// Minimum bars needed for a report.
    pub const MIN_BARS: usize = 2;

    /// Generator over the latest `window` bars.
    pub fn new(window: usize) -> Self {
        assert!(window > 0, "Report window must be greater than 0");
        Self {
            window: Some(window),
        }
    }

    /// Generator over every bar of the series.
    pub fn unbounded() -> Self {
        Self { window: None }
    }

    pub fn window(&self) -> Option<usize> {
        self.window
    }

    /// Generate the report for the latest bar of `series`.
    pub fn generate(&self, series: &PriceSeries) -> AnalysisResult<Report> {
        if series.is_empty() {
            return Err(AnalysisError::DataUnavailable {
                symbol: series.symbol().to_string(),
            });
        }

        let bars = match self.window {
            Some(n) => series.last_n(n),
            None => series.bars(),
        };

        let [.., prev, latest] = bars else {
            return Err(AnalysisError::InsufficientData {
                required: Self::MIN_BARS,
                available: bars.len(),
            });
        };

        let change = (latest.close - prev.close) / prev.close * 100.0;
        if !change.is_finite() {
            return Err(AnalysisError::ComputeError(format!(
                "price change undefined for previous close {}",
                prev.close
            )));
        }

        let atr = RangeAtr::new()
            .evaluate(bars)
            .filter(|v| v.is_finite())
            .ok_or_else(|| AnalysisError::ComputeError("ATR is not finite".to_string()))?;

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let signals = technical_signals(&closes);

        debug!(
            "{} report over {} bars ending {}: {} signals",
            series.symbol(),
            bars.len(),
            latest.date,
            signals.len()
        );

        Ok(Report {
            symbol: series.symbol().to_string(),
            date: latest.date,
            price: latest.close,
            change,
            volume: latest.volume / 1e6,
            atr,
            volume_alert: AbnormalVolume::new().evaluate(bars),
            technical_signals: signals,
            volatility_alert: VolatilityCluster::new().evaluate(bars),
            money_flow: MoneyFlow::new().evaluate(bars),
            fundamentals: series.fundamentals().cloned(),
        })
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, series, series_from_closes};
    use stocklens_core::types::Bar;
    use stocklens_core::ErrorKind;

    #[test]
    fn test_empty_series_is_data_unavailable() {
        let err = ReportGenerator::default()
            .generate(&PriceSeries::empty("AAPL"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataUnavailable);
    }

    #[test]
    fn test_single_bar_is_insufficient() {
        let err = ReportGenerator::default()
            .generate(&series_from_closes("AAPL", &[100.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData {
                required: 2,
                available: 1
            }
        ));
    }

    #[test]
    fn test_volume_breakout_report() {
        let s = series(
            "AAPL",
            &[100.0, 102.0, 98.0, 101.0, 105.0],
            &[1000.0, 1000.0, 1000.0, 1000.0, 3000.0],
        );
        let report = ReportGenerator::default().generate(&s).unwrap();

        assert_eq!(report.volume_alert, VolumeAlert::Breakout);
        assert_eq!(report.date, s.last().unwrap().date);
        assert!((report.price - 105.0).abs() < f64::EPSILON);
        assert!((report.change - (105.0 - 101.0) / 101.0 * 100.0).abs() < 1e-10);
        assert!((report.volume - 0.003).abs() < 1e-12);
        // every bar spans close +/- 1
        assert!((report.atr - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_window_limits_bars() {
        // two wide early bars fall outside the 5-bar window
        let bars: Vec<Bar> = (0..7)
            .map(|i| {
                let spread = if i < 2 { 10.0 } else { 1.0 };
                Bar::new(day(i), 100.0, 100.0 + spread, 100.0 - spread, 100.0, 1_000.0)
            })
            .collect();
        let s = PriceSeries::new("AAPL", bars).unwrap();

        let windowed = ReportGenerator::new(5).generate(&s).unwrap();
        let full = ReportGenerator::unbounded().generate(&s).unwrap();
        assert_eq!(windowed.date, full.date);
        assert!((windowed.atr - 2.0).abs() < 1e-10);
        assert!((full.atr - 50.0 / 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_previous_close_is_compute_error() {
        let s = series_from_closes("AAPL", &[0.0, 1.0]);
        let err = ReportGenerator::default().generate(&s).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ComputeError);
    }

    #[test]
    fn test_generate_is_idempotent() {
        let closes: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 3.0)
            .collect();
        let s = series_from_closes("MSFT", &closes);
        let generator = ReportGenerator::unbounded();

        let first = serde_json::to_string(&generator.generate(&s).unwrap()).unwrap();
        let second = serde_json::to_string(&generator.generate(&s).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_json_shape() {
        let s = series_from_closes("AAPL", &[100.0, 101.0, 102.0]);
        let json = serde_json::to_value(ReportGenerator::default().generate(&s).unwrap()).unwrap();

        assert_eq!(json["date"], "2024-01-03");
        assert_eq!(json["volume_alert"], "Volume within normal range");
        assert_eq!(json["volatility_alert"], "Normal volatility");
        assert!(json["technical_signals"].is_array());
        assert!(json.get("fundamentals").is_none());
    }

    #[test]
    fn test_fundamentals_carried_into_report() {
        let fundamentals = Fundamentals {
            sector: "Technology".to_string(),
            market_cap: 3.0e12,
            pe_ratio: 31.5,
            ..Fundamentals::default()
        };
        let s = series_from_closes("AAPL", &[100.0, 101.0, 102.0]).with_fundamentals(fundamentals);
        let report = ReportGenerator::default().generate(&s).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["fundamentals"]["sector"], "Technology");
        assert_eq!(json["fundamentals"]["peRatio"], 31.5);

        let summary = report.summary();
        assert!(summary.contains("Sector:              Technology"));
        assert!(summary.contains("Market Cap:          3000.00B"));
    }

    #[test]
    fn test_summary() {
        let s = series_from_closes("AAPL", &[100.0, 101.0, 102.0]);
        let summary = ReportGenerator::default().generate(&s).unwrap().summary();
        assert!(summary.contains("DAILY REPORT  AAPL  2024-01-03"));
        assert!(summary.contains("Close:               102.00"));
        assert!(summary.contains("(none)"));
    }
}
