//! Error types for portpuls
//!
//! This module defines the two failure families of an analysis attempt:
//! local validation of the form and the remote request itself.

use thiserror::Error;

/// Message shown for any request failure without a usable server detail.
pub const GENERIC_FAILURE: &str = "Analysis failed.";

/// Validation errors for the composed portfolio.
///
/// These errors are shown directly to users and should be clear and actionable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter at least one valid asset.")]
    NoValidAssets,
}

/// Failures of a submitted analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Connection, timeout or other transport-level failure
    #[error("request to analysis service failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("analysis service returned status {status}")]
    Rejected { status: u16, detail: Option<String> },

    /// The service answered with a body that does not match the result schema
    #[error("malformed analysis response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl AnalysisError {
    /// The single-line message presented to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::Rejected {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message() {
        assert_eq!(
            ValidationError::NoValidAssets.to_string(),
            "Please enter at least one valid asset."
        );
    }

    #[test]
    fn test_rejected_with_detail_shows_detail() {
        let err = AnalysisError::Rejected {
            status: 400,
            detail: Some("Invalid symbol".to_string()),
        };
        assert_eq!(err.user_message(), "Invalid symbol");
        assert_eq!(err.to_string(), "analysis service returned status 400");
    }

    #[test]
    fn test_fallback_message() {
        let err = AnalysisError::Rejected {
            status: 500,
            detail: None,
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let err = AnalysisError::Rejected {
            status: 400,
            detail: Some(String::new()),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE);

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(AnalysisError::from(json_err).user_message(), GENERIC_FAILURE);
    }
}
