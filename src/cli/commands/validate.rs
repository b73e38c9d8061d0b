//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use stocklens_config::load_config;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());

    match load_config(config_path) {
        Ok(config) => {
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Provider: {:?}", config.data.provider);
            println!("Timezone: {}", config.data.timezone);
            println!("Report window: {} bars", config.analysis.report_window);
            println!(
                "Backtest window: -{} / +{} days",
                config.analysis.backtest_lookback_days, config.analysis.backtest_lookahead_days
            );
            println!();
            println!("Effective configuration:");
            println!("{}", config.to_toml()?);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
