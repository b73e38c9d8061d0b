//! stocklens CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::process::ExitCode;
use stocklens_config::load_config;
use stocklens_monitor::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if let Commands::ValidateConfig = cli.command {
        cli::commands::validate::run(&cli.config).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    // Setup logging
    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.json_logs || config.logging.format == "json";
    let _guard = setup_logging(&level, json, config.logging.file.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Report(args) => cli::commands::report::run(args, &config).await,
        Commands::Backtest(args) => cli::commands::backtest::run(args, &config).await,
        Commands::Market(args) => {
            cli::commands::market::run(args, &config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::ValidateConfig => Ok(ExitCode::SUCCESS),
    }
}
