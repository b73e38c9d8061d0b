//! Error types for stocklens.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification of an analysis failure, carried in serialized error payloads
/// so callers can branch without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DataUnavailable,
    InsufficientData,
    DateResolutionFailure,
    NoSubsequentTradingDay,
    ComputeError,
    InvalidRequest,
}

/// Engine-level error returned by report generation and backtesting.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("No price data available for {symbol}")]
    DataUnavailable { symbol: String },

    #[error("Insufficient data: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Could not resolve a trading day near {target}")]
    DateResolutionFailure { target: NaiveDate },

    #[error("No trading day after {date} in the fetched window")]
    NoSubsequentTradingDay { date: NaiveDate },

    #[error("Computation error: {0}")]
    ComputeError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Data source error: {0}")]
    Source(#[from] DataError),
}

impl AnalysisError {
    /// The payload kind for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::DataUnavailable { .. } | AnalysisError::Source(_) => {
                ErrorKind::DataUnavailable
            }
            AnalysisError::InsufficientData { .. } => ErrorKind::InsufficientData,
            AnalysisError::DateResolutionFailure { .. } => ErrorKind::DateResolutionFailure,
            AnalysisError::NoSubsequentTradingDay { .. } => ErrorKind::NoSubsequentTradingDay,
            AnalysisError::ComputeError(_) => ErrorKind::ComputeError,
            AnalysisError::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    /// True when the caller supplied a bad request rather than the analysis failing.
    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::InvalidRequest
    }

    /// Process exit status: 2 for a bad request, 3 for a failed analysis.
    pub fn exit_status(&self) -> u8 {
        if self.is_client_error() {
            2
        } else {
            3
        }
    }
}

impl From<&AnalysisError> for std::process::ExitCode {
    fn from(err: &AnalysisError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

/// Price history source errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("Rate limited by provider")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Data source error: {0}")]
    Internal(String),
}

impl DataError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::RateLimited { .. } | DataError::ConnectionError(_)
        )
    }
}

/// Result type alias for engine operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;
