//! # Order Pipeline
//!
//! The ordered stages applied to one logical order event and the
//! orchestration that composes them into invocations.

pub mod enricher;
pub mod error_classifier;
pub mod identity;
pub mod orchestrator;
pub mod persister;
pub mod publisher;
pub mod response;
pub mod validator;

pub use enricher::Enricher;
pub use error_classifier::{
    ErrorCategory, ErrorClassification, ErrorClassifier, StandardErrorClassifier,
};
pub use identity::{IdentityAssigner, OrderIdStrategy};
pub use orchestrator::{IngestStages, OrderPipeline};
pub use persister::Persister;
pub use publisher::EventPublisher;
pub use response::InvocationResult;
pub use validator::Validator;
