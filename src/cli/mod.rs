//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stocklens")]
#[command(author, version, about = "Daily stock signal reports and next-day backtests")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "STOCKLENS_CONFIG")]
    pub config: PathBuf,

    /// Log level, overrides the configuration file
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the daily report for a symbol
    Report(ReportArgs),
    /// Replay the report as of a past date and score it against the next session
    Backtest(BacktestArgs),
    /// Show the latest session of the market overview instruments
    Market(MarketArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct ReportArgs {
    /// Ticker symbol
    pub symbol: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the JSON result to a file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Ticker symbol
    pub symbol: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// End date (YYYY-MM-DD), the date that is backtested
    #[arg(long)]
    pub end: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Save the JSON result to a file
    #[arg(long)]
    pub save: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct MarketArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}
