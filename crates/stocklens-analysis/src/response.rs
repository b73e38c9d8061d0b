//! Serialized result payloads.

use serde::{Deserialize, Serialize};
use stocklens_core::{AnalysisError, AnalysisResult, ErrorKind};

/// Either the bare result object or an `{error, kind}` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisResponse<T> {
    Error { error: String, kind: ErrorKind },
    Success(T),
}

impl<T> AnalysisResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResponse::Success(_))
    }

    /// Error kind, if this is an error payload.
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            AnalysisResponse::Error { kind, .. } => Some(*kind),
            AnalysisResponse::Success(_) => None,
        }
    }
}

impl<T> From<AnalysisError> for AnalysisResponse<T> {
    fn from(err: AnalysisError) -> Self {
        AnalysisResponse::Error {
            kind: err.kind(),
            error: err.to_string(),
        }
    }
}

impl<T> From<AnalysisResult<T>> for AnalysisResponse<T> {
    fn from(result: AnalysisResult<T>) -> Self {
        match result {
            Ok(value) => AnalysisResponse::Success(value),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportGenerator;
    use crate::test_support::series_from_closes;
    use serde_json::json;

    #[test]
    fn test_success_is_bare_object() {
        let report = ReportGenerator::default().generate(&series_from_closes("AAPL", &[100.0, 101.0]));
        let response = AnalysisResponse::from(report);
        assert!(response.is_success());

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["symbol"], "AAPL");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_payload() {
        let response: AnalysisResponse<()> = AnalysisError::InsufficientData {
            required: 2,
            available: 1,
        }
        .into();

        assert_eq!(response.error_kind(), Some(ErrorKind::InsufficientData));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "error": "Insufficient data: need 2 bars, have 1",
                "kind": "insufficient_data"
            })
        );
    }
}
