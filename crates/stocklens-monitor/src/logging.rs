//! Logging setup.

use std::path::Path;
use thiserror::Error;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::WorkerGuard;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log file path: {0}")]
    InvalidPath(String),

    #[error("Could not open log file: {0}")]
    File(#[from] InitError),

    #[error("Logging already initialized: {0}")]
    Init(#[from] TryInitError),
}

/// Setup logging with the given level.
///
/// Console logs go to stderr so stdout carries only command output.
/// `RUST_LOG` takes precedence over `level`. When `file` is given, plain-text
/// logs are also written there through a background writer; keep the returned
/// guard alive until exit so buffered lines are flushed.
pub fn setup_logging(
    level: &str,
    json: bool,
    file: Option<&Path>,
) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().pretty().with_writer(std::io::stderr).boxed()
    };

    let (file_layer, guard) = match file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(filter)
        .try_init()?;

    Ok(guard)
}

fn file_appender(path: &Path) -> Result<RollingFileAppender, LoggingError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    Ok(RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)?)
}
