//! Configuration management.

mod settings;

pub use settings::{
    AnalysisSettings, AppConfig, AppSettings, DataProvider, DataSettings, InstrumentConfig,
    LoggingConfig, MarketSettings,
};

use config::{Config, Environment, File};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix, e.g. `STOCKLENS__DATA__PROVIDER=csv`.
pub const ENV_PREFIX: &str = "STOCKLENS";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration from file and environment, then validate it.
pub fn load_config(path: &Path) -> Result<AppConfig, SettingsError> {
    load_with_env(path, environment())
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn load_with_env(path: &Path, env: Environment) -> Result<AppConfig, SettingsError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(env)
        .build()?;

    let settings: AppConfig = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, body).unwrap();
        path
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[app]\nname = \"lens\"\n");

        let settings = load_with_env(&path, env(&[])).unwrap();
        assert_eq!(settings.app.name, "lens");
        assert_eq!(settings.app.environment, "development");
        assert_eq!(settings.data.provider, DataProvider::Yahoo);
        assert_eq!(settings.analysis.report_window, 5);
        assert_eq!(settings.analysis.backtest_lookback_days, 60);
        assert!(settings.data.fetch_fundamentals);
        assert!(settings.market.instruments.is_empty());
    }

    #[test]
    fn test_file_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[data]
provider = "csv"
csv_dir = "/tmp/prices"
timezone = "Europe/London"

[analysis]
report_window = 10

[[market.instruments]]
name = "Gold"
symbol = "GC=F"
"#,
        );

        let settings = load_with_env(&path, env(&[])).unwrap();
        assert_eq!(settings.data.provider, DataProvider::Csv);
        assert_eq!(settings.data.timezone().unwrap(), chrono_tz::Europe::London);
        assert_eq!(settings.analysis.report_window, 10);
        assert_eq!(settings.market.instruments[0].symbol, "GC=F");
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "[analysis]\nreport_window = 10\n");

        let settings = load_with_env(
            &path,
            env(&[
                ("STOCKLENS__ANALYSIS__REPORT_WINDOW", "20"),
                ("STOCKLENS__DATA__PROVIDER", "csv"),
                ("STOCKLENS__DATA__FETCH_FUNDAMENTALS", "false"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.analysis.report_window, 20);
        assert_eq!(settings.data.provider, DataProvider::Csv);
        assert!(!settings.data.fetch_fundamentals);
    }

    #[test]
    fn test_missing_file() {
        let err = load_with_env(Path::new("/no/such/config.toml"), env(&[])).unwrap_err();
        assert!(matches!(err, SettingsError::Load(_)));
    }

    #[test]
    fn test_validation() {
        let mut settings = AppConfig::default();
        assert!(settings.validate().is_ok());

        settings.data.timezone = "Mars/Olympus".to_string();
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));

        let mut settings = AppConfig::default();
        settings.analysis.report_window = 0;
        assert!(settings.validate().is_err());

        let mut settings = AppConfig::default();
        settings.data.provider = DataProvider::Csv;
        settings.data.csv_dir = Default::default();
        assert!(settings.validate().is_err());

        let mut settings = AppConfig::default();
        settings.logging.format = "xml".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_shipped_default_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let settings = load_with_env(&path, env(&[])).unwrap();
        assert_eq!(settings.app.name, "stocklens");
        assert!(!settings.market.instruments.is_empty());
    }

    #[test]
    fn test_effective_config_renders_as_toml() {
        let rendered = AppConfig::default().to_toml().unwrap();
        assert!(rendered.contains("[analysis]"));
        assert!(rendered.contains("provider = \"yahoo\""));
        assert!(!rendered.contains("file ="));
    }
}
