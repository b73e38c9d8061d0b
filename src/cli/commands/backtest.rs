//! Backtest command implementation.

use anyhow::Result;
use std::process::ExitCode;
use stocklens_analysis::{AnalysisResponse, BacktestRequest, BacktestResult};
use stocklens_config::AppConfig;
use tracing::info;

use super::{build_analyzer, save_json};
use crate::cli::{BacktestArgs, OutputFormat};

pub async fn run(args: BacktestArgs, config: &AppConfig) -> Result<ExitCode> {
    info!(
        "Starting backtest for {} ({} to {})",
        args.symbol, args.start, args.end
    );

    let analyzer = build_analyzer(config, false)?;
    let request = BacktestRequest::new(&args.symbol, &args.start, &args.end);
    let result = analyzer.backtest(&request).await;
    let code = match &result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(e),
    };
    let response = AnalysisResponse::from(result);

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => print_text(&response),
    }

    if let Some(path) = &args.save {
        save_json(&response, path)?;
    }

    Ok(code)
}

fn print_text(response: &AnalysisResponse<BacktestResult>) {
    match response {
        AnalysisResponse::Success(result) => println!("{}", result.summary()),
        AnalysisResponse::Error { error, kind } => {
            eprintln!("Backtest failed ({:?}): {}", kind, error)
        }
    }
}
