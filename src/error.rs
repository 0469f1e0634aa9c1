//! # Pipeline Error Types
//!
//! Structured error handling for the order pipeline using thiserror. Each
//! stage owns a narrow error type; [`PipelineError`] is the invocation-level
//! union that the orchestrator classifies and turns into a response.

use crate::constants::ORDER_REQUIRED_FIELDS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a detail failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    MissingFields,
    InvalidAmount,
    AmountOutOfRange,
    InvalidCustomerId,
    InvalidCategory,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationErrorKind::MissingFields => write!(f, "missing_fields"),
            ValidationErrorKind::InvalidAmount => write!(f, "invalid_amount"),
            ValidationErrorKind::AmountOutOfRange => write!(f, "amount_out_of_range"),
            ValidationErrorKind::InvalidCustomerId => write!(f, "invalid_customer_id"),
            ValidationErrorKind::InvalidCategory => write!(f, "invalid_category"),
        }
    }
}

/// Terminal rejection of an order detail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{cause}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Offending field names; for `MissingFields` exactly the missing keys
    pub fields: Vec<String>,
    pub cause: String,
}

impl ValidationError {
    pub fn missing_fields(fields: Vec<String>) -> Self {
        let cause = format!("Missing required keys in 'detail': {fields:?}");
        Self {
            kind: ValidationErrorKind::MissingFields,
            fields,
            cause,
        }
    }

    pub fn invalid_amount() -> Self {
        Self {
            kind: ValidationErrorKind::InvalidAmount,
            fields: vec![ORDER_REQUIRED_FIELDS[1].to_string()],
            cause: "Invalid amount; must be greater than zero.".to_string(),
        }
    }

    /// Positive amount that an exact decimal (28 significant digits) cannot hold
    pub fn amount_out_of_range() -> Self {
        Self {
            kind: ValidationErrorKind::AmountOutOfRange,
            fields: vec![ORDER_REQUIRED_FIELDS[1].to_string()],
            cause: "Invalid amount; must fit in an exact decimal of at most 28 significant digits."
                .to_string(),
        }
    }

    pub fn invalid_customer_id() -> Self {
        Self {
            kind: ValidationErrorKind::InvalidCustomerId,
            fields: vec![ORDER_REQUIRED_FIELDS[2].to_string()],
            cause: "Invalid customerId; must start with 'CUST'.".to_string(),
        }
    }

    pub fn invalid_category() -> Self {
        Self {
            kind: ValidationErrorKind::InvalidCategory,
            fields: vec![ORDER_REQUIRED_FIELDS[0].to_string()],
            cause: "Invalid category; must be a string.".to_string(),
        }
    }
}

/// Durable store failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// Store rejected the write or timed out; the whole record may be retried
    #[error("Order store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Unknown persistence failure: {cause}")]
    Unknown { cause: String },
}

impl PersistenceError {
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            message: message.into(),
        }
    }

    pub fn unknown(cause: impl Into<String>) -> Self {
        Self::Unknown {
            cause: cause.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable { .. })
    }
}

/// Classify sqlx failures the same way the store's callers need them:
/// connectivity and contention are transient, everything else is unknown.
impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                PersistenceError::store_unavailable(err.to_string())
            }
            sqlx::Error::Tls(_) => PersistenceError::store_unavailable(err.to_string()),
            sqlx::Error::Database(db_err) => match db_err.code() {
                Some(code) if is_transient_sqlstate(&code) => {
                    PersistenceError::store_unavailable(db_err.to_string())
                }
                _ => PersistenceError::unknown(db_err.to_string()),
            },
            _ => PersistenceError::unknown(err.to_string()),
        }
    }
}

/// Connection exceptions (08), insufficient resources (53), operator
/// intervention (57P), serialization failure and deadlock.
pub(crate) fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08")
        || code.starts_with("53")
        || code.starts_with("57P")
        || code == "40001"
        || code == "40P01"
}

/// Outbound event channel failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// A required envelope field is absent; a configuration or data fault
    #[error("Malformed event envelope: missing required fields {missing:?}")]
    MalformedEnvelope { missing: Vec<String> },

    #[error("Event detail could not be serialized: {message}")]
    Serialization { message: String },

    #[error("Event channel unavailable: {message}")]
    ChannelUnavailable { message: String },

    #[error("Unknown publish failure: {cause}")]
    Unknown { cause: String },
}

impl PublishError {
    pub fn malformed_envelope(missing: Vec<String>) -> Self {
        Self::MalformedEnvelope { missing }
    }

    pub fn channel_unavailable(message: impl Into<String>) -> Self {
        Self::ChannelUnavailable {
            message: message.into(),
        }
    }

    pub fn unknown(cause: impl Into<String>) -> Self {
        Self::Unknown {
            cause: cause.into(),
        }
    }
}

impl From<sqlx::Error> for PublishError {
    fn from(err: sqlx::Error) -> Self {
        match PersistenceError::from(err) {
            PersistenceError::StoreUnavailable { message } => {
                PublishError::channel_unavailable(message)
            }
            PersistenceError::Unknown { cause } => PublishError::unknown(cause),
        }
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        PublishError::Serialization {
            message: err.to_string(),
        }
    }
}

/// Failures while unwrapping an inbound envelope into a canonical payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnwrapError {
    #[error("Unsupported event source: {source_name}")]
    UnsupportedSource { source_name: String },

    #[error("Invalid JSON in {location}: {message}")]
    InvalidJson { location: String, message: String },

    #[error("Missing '{path}' in inbound record")]
    MissingPath { path: String },

    #[error("Expected a JSON {expected} at '{path}'")]
    UnexpectedShape { path: String, expected: String },
}

impl UnwrapError {
    pub fn unsupported_source(source_name: impl Into<String>) -> Self {
        Self::UnsupportedSource {
            source_name: source_name.into(),
        }
    }

    pub fn invalid_json(location: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::InvalidJson {
            location: location.into(),
            message: err.to_string(),
        }
    }

    pub fn missing_path(path: impl Into<String>) -> Self {
        Self::MissingPath { path: path.into() }
    }

    pub fn unexpected_shape(path: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::UnexpectedShape {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

/// Configuration loading and validation failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid value for '{field}': {value}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {message}")]
    Load { message: String },
}

impl ConfigurationError {
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        ConfigurationError::Load {
            message: err.to_string(),
        }
    }
}

/// Invocation-level error: anything that short-circuits a record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Unwrap error: {0}")]
    Unwrap(#[from] UnwrapError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Detail lacked the structure needed to build a record when validation was not wired in
    #[error("Malformed order detail: {message}")]
    MalformedDetail { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PipelineError {
    pub fn malformed_detail(message: impl Into<String>) -> Self {
        Self::MalformedDetail {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
