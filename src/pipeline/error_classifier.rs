//! # Pipeline Error Classification
//!
//! Maps every invocation-level failure to a category, a retry hint and a
//! stable error code. The pipeline itself never retries; the hint tells the
//! external runtime whether redelivering the invocation can help.
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │ PipelineError   │────▶│ ErrorClassifier │────▶│ Classification  │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```

use crate::error::{PersistenceError, PipelineError, PublishError};
use serde::{Deserialize, Serialize};

/// Primary error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Data is wrong; redelivery will fail the same way
    Permanent,

    /// External collaborator hiccup; redelivery may succeed
    Transient,

    /// Deployment or wiring fault; needs manual intervention
    Configuration,

    /// Unclassified; treated conservatively as redeliverable
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Permanent => write!(f, "Permanent"),
            ErrorCategory::Transient => write!(f, "Transient"),
            ErrorCategory::Configuration => write!(f, "Configuration"),
            ErrorCategory::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of error classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorClassification {
    pub error_category: ErrorCategory,
    pub is_retryable: bool,
    pub error_code: String,
    pub error_message: String,
}

/// Trait for error classification strategies
pub trait ErrorClassifier: Send + Sync {
    fn classify_error(&self, error: &PipelineError) -> ErrorClassification;

    fn classifier_name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardErrorClassifier;

impl StandardErrorClassifier {
    pub fn new() -> Self {
        Self
    }

    fn classification(
        category: ErrorCategory,
        code: &str,
        error: &PipelineError,
    ) -> ErrorClassification {
        ErrorClassification {
            error_category: category,
            is_retryable: matches!(category, ErrorCategory::Transient | ErrorCategory::Unknown),
            error_code: code.to_string(),
            error_message: error.to_string(),
        }
    }
}

impl ErrorClassifier for StandardErrorClassifier {
    fn classify_error(&self, error: &PipelineError) -> ErrorClassification {
        use ErrorCategory::*;

        let (category, code) = match error {
            PipelineError::Validation(_) => (Permanent, "VALIDATION_ERROR"),
            PipelineError::Persistence(PersistenceError::StoreUnavailable { .. }) => {
                (Transient, "STORE_UNAVAILABLE")
            }
            PipelineError::Persistence(PersistenceError::Unknown { .. }) => {
                (Unknown, "PERSISTENCE_ERROR")
            }
            PipelineError::Publish(PublishError::MalformedEnvelope { .. }) => {
                (Configuration, "MALFORMED_ENVELOPE")
            }
            PipelineError::Publish(PublishError::Serialization { .. }) => {
                (Permanent, "SERIALIZATION_ERROR")
            }
            PipelineError::Publish(PublishError::ChannelUnavailable { .. }) => {
                (Transient, "CHANNEL_UNAVAILABLE")
            }
            PipelineError::Publish(PublishError::Unknown { .. }) => (Unknown, "PUBLISH_ERROR"),
            PipelineError::Unwrap(_) => (Permanent, "UNWRAP_ERROR"),
            PipelineError::MalformedDetail { .. } => (Permanent, "MALFORMED_DETAIL"),
            PipelineError::Configuration(_) => (Configuration, "CONFIGURATION_ERROR"),
            PipelineError::Internal { .. } => (Unknown, "INTERNAL_ERROR"),
        };

        Self::classification(category, code, error)
    }

    fn classifier_name(&self) -> &'static str {
        "StandardErrorClassifier"
    }
}
