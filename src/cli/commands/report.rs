//! Daily report command implementation.

use anyhow::Result;
use std::process::ExitCode;
use stocklens_analysis::{AnalysisResponse, Report};
use stocklens_config::AppConfig;
use tracing::info;

use super::{build_analyzer, save_json};
use crate::cli::{OutputFormat, ReportArgs};

pub async fn run(args: ReportArgs, config: &AppConfig) -> Result<ExitCode> {
    info!("Generating daily report for {}", args.symbol);

    let analyzer = build_analyzer(config, config.data.fetch_fundamentals)?;
    let result = analyzer.daily_report(&args.symbol).await;
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

fn print_text(response: &AnalysisResponse<Report>) {
    match response {
        AnalysisResponse::Success(report) => println!("{}", report.summary()),
        AnalysisResponse::Error { error, kind } => {
            eprintln!("Report failed ({:?}): {}", kind, error)
        }
    }
}
