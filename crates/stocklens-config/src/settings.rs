//! Configuration structures.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SettingsError;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub market: MarketSettings,
}

impl AppConfig {
    /// Reject settings that would only fail later, mid-request.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.data.timezone()?;

        if self.analysis.report_window == 0 {
            return Err(SettingsError::Invalid(
                "analysis.report_window must be greater than 0".to_string(),
            ));
        }
        if self.analysis.report_lookback_days == 0 {
            return Err(SettingsError::Invalid(
                "analysis.report_lookback_days must be greater than 0".to_string(),
            ));
        }
        if self.data.provider == DataProvider::Csv
            && self.data.csv_dir.as_os_str().is_empty()
        {
            return Err(SettingsError::Invalid(
                "data.csv_dir is required with the csv provider".to_string(),
            ));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(SettingsError::Invalid(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "stocklens".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Where price history comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataProvider {
    Yahoo,
    Csv,
}

/// Price history source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub provider: DataProvider,
    pub base_url: String,
    pub csv_dir: PathBuf,
    /// IANA name of the exchange timezone
    pub timezone: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Look up company fundamentals for the daily report (one extra request)
    pub fetch_fundamentals: bool,
}

impl DataSettings {
    /// Parsed exchange timezone.
    pub fn timezone(&self) -> Result<Tz, SettingsError> {
        self.timezone
            .parse()
            .map_err(|_| SettingsError::Invalid(format!("unknown timezone '{}'", self.timezone)))
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            provider: DataProvider::Yahoo,
            base_url: "https://query1.finance.yahoo.com".to_string(),
            csv_dir: PathBuf::from("data"),
            timezone: "America/New_York".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            retry_base_delay_ms: 500,
            fetch_fundamentals: true,
        }
    }
}

/// Report and backtest windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub report_window: usize,
    pub report_lookback_days: u32,
    pub backtest_lookback_days: u32,
    pub backtest_lookahead_days: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            report_window: 5,
            report_lookback_days: 7,
            backtest_lookback_days: 60,
            backtest_lookahead_days: 10,
        }
    }
}

/// One entry of the market overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub name: String,
    pub symbol: String,
}

/// Market overview settings. An empty list selects the built-in instruments.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MarketSettings {
    pub instruments: Vec<InstrumentConfig>,
}
