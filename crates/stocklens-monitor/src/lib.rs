//! Tracing subscriber setup for stocklens binaries.

mod logging;

pub use logging::{setup_logging, LoggingError};
pub use tracing_appender::non_blocking::WorkerGuard;
