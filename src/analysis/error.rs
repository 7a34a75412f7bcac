//! Analysis error types
//!
//! One taxonomy for the whole workflow. Validation failures are reported
//! before any request is sent; everything else is recovered locally by
//! substituting a sample result, so no variant is fatal to the session.

use serde::Serialize;
use thiserror::Error;

use crate::capture::CameraError;

use super::client::REQUEST_TIMEOUT_SECS;

/// Workflow error types
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid image: {0}")]
    Validation(String),

    /// Request-level failure talking to the webhook
    #[error("Network error: {0}")]
    Network(String),

    /// Connection-level rejection: the service could not be reached at all
    #[error("Analysis service unreachable: {0}")]
    Unreachable(String),

    #[error("Analysis request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Analysis service returned {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Response format not recognized: {0}")]
    Format(String),

    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    /// Whether the one-shot retry applies: only network-class failures,
    /// never timeouts, HTTP-status failures, or bad payloads
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AnalysisError::Network(_) | AnalysisError::Unreachable(_)
        )
    }

    /// Advisory category for this failure
    pub fn failure_class(&self) -> FailureClass {
        match self {
            AnalysisError::Timeout(_) => FailureClass::Timeout,
            AnalysisError::Unreachable(_) => FailureClass::Unreachable,
            AnalysisError::HttpStatus { .. } => FailureClass::Server,
            AnalysisError::Format(_) | AnalysisError::Json(_) => FailureClass::Format,
            _ => FailureClass::Network,
        }
    }
}

impl From<reqwest::Error> for AnalysisError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AnalysisError::Timeout(REQUEST_TIMEOUT_SECS)
        } else if err.is_connect() {
            AnalysisError::Unreachable(err.to_string())
        } else {
            AnalysisError::Network(err.to_string())
        }
    }
}

/// Categories for the user-visible advisory shown with a fallback result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    Timeout,
    Unreachable,
    Network,
    Server,
    Format,
}

impl FailureClass {
    /// The advisory text paired with a sample result for this failure
    pub fn advisory_message(&self) -> &'static str {
        match self {
            FailureClass::Timeout => {
                "Analysis is taking longer than expected. Here are sample results."
            }
            FailureClass::Unreachable => {
                "Showing a sample analysis while we reconnect to the AI service."
            }
            FailureClass::Network => {
                "Quick sample results. Still trying to reach the AI service."
            }
            FailureClass::Server => {
                "AI service is busy. Here is a sample analysis for now."
            }
            FailureClass::Format => {
                "Sample analysis ready. The AI service response could not be used."
            }
        }
    }
}
