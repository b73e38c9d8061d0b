//! End-to-end runs of the stocklens binary over a CSV price directory.

use chrono::{Duration, NaiveDate};
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn write_fixture(dir: &TempDir) -> PathBuf {
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
    for i in 0..40 {
        let close = 100.0 + (i % 7) as f64 - (i % 3) as f64 * 0.5;
        writeln!(
            csv,
            "{},{:.2},{:.2},{:.2},{:.2},{}",
            start + Duration::days(i),
            close - 0.5,
            close + 1.0,
            close - 1.0,
            close,
            1_000 + i * 10
        )
        .unwrap();
    }
    fs::write(data.join("AAPL.csv"), csv).unwrap();

    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[logging]\nlevel = \"info\"\nformat = \"pretty\"\n\n[data]\nprovider = \"csv\"\ncsv_dir = \"{}\"\nmax_retries = 0\n",
            data.display()
        ),
    )
    .unwrap();
    config
}

fn stocklens(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stocklens"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("STOCKLENS_CONFIG")
        .output()
        .unwrap()
}

#[test]
fn test_json_backtest_stdout_is_only_the_payload() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(&dir);

    let output = stocklens(
        &config,
        &["backtest", "AAPL", "--start", "2024-01-01", "--end", "2024-01-20", "-o", "json"],
    );

    assert_eq!(output.status.code(), Some(0));
    let payload: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["symbol"], "AAPL");
    assert_eq!(payload["test_date"], "2024-01-20");
    // logs still go out, just not on stdout
    assert!(String::from_utf8_lossy(&output.stderr).contains("Starting backtest"));
}

#[test]
fn test_json_error_payload_and_exit_status() {
    let dir = TempDir::new().unwrap();
    let config = write_fixture(&dir);

    let output = stocklens(
        &config,
        &["backtest", "AAPL", "--start", "2024-02-01", "--end", "2024-01-20", "-o", "json"],
    );

    assert_eq!(output.status.code(), Some(2));
    let payload: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(payload["kind"], "invalid_request");
    assert!(payload["error"].as_str().unwrap().contains("after end date"));
}
