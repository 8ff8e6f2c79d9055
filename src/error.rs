//! Error taxonomy shared by the detector and the extractor

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while analysing a page
///
/// These never escape `Detector::classify` or `Extractor::extract`; both
/// convert them into failure results.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("insufficient content extracted ({found} chars, need {required})")]
    InsufficientContent { found: usize, required: usize },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("analysis failed: {0}")]
    AnalysisFailure(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScanError {
    /// Tag used when the error is reported inside a result
    pub fn kind(&self) -> FailureKind {
        match self {
            ScanError::InsufficientContent { .. } => FailureKind::InsufficientContent,
            ScanError::InvalidOptions(_) => FailureKind::InvalidOptions,
            ScanError::AnalysisFailure(_) | ScanError::Serialization(_) => {
                FailureKind::AnalysisFailure
            }
        }
    }
}

/// Serializable failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InsufficientContent,
    AnalysisFailure,
    InvalidOptions,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::InsufficientContent => write!(f, "insufficient content"),
            FailureKind::AnalysisFailure => write!(f, "analysis failure"),
            FailureKind::InvalidOptions => write!(f, "invalid options"),
        }
    }
}

/// Failure details carried by a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&ScanError> for Failure {
    fn from(err: &ScanError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_content_message() {
        let err = ScanError::InsufficientContent {
            found: 150,
            required: 2000,
        };
        assert_eq!(
            err.to_string(),
            "insufficient content extracted (150 chars, need 2000)"
        );
        assert_eq!(err.kind(), FailureKind::InsufficientContent);
    }

    #[test]
    fn test_failure_from_error() {
        let err = ScanError::InvalidOptions("max_length must be positive".to_string());
        let failure = Failure::from(&err);
        assert_eq!(failure.kind, FailureKind::InvalidOptions);
        assert!(failure.message.contains("max_length"));
    }
}
