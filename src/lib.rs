#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Order Pipeline
//!
//! Processing pipeline for incoming order events: validation, priority
//! enrichment, durable persistence and downstream event emission.
//!
//! ## Overview
//!
//! An external event-driven runtime invokes the pipeline once per inbound
//! batch. Each record is unwrapped into a canonical order detail and passed
//! through the stages in order; the first failure short-circuits the
//! record and aborts the rest of the invocation.
//!
//! ```text
//! envelope ─▶ Validator ─▶ Enricher ─▶ IdentityAssigner ─▶ Persister ─▶ OrderStore
//! envelope ─▶ OutboundEventEnvelope ─▶ EventPublisher ─▶ EventChannel
//! ```
//!
//! The store and the event channel are injected as trait objects, so the
//! pipeline holds no process-wide clients and runs concurrently across
//! invocations.
//!
//! ## Module Organization
//!
//! - [`models`] - Order detail, validated detail, order record, outbound envelope
//! - [`pipeline`] - Stages, orchestration, error classification, invocation results
//! - [`messaging`] - Inbound envelope resolution and outbound event channels
//! - [`storage`] - Order store seam with PostgreSQL and in-memory stores
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use order_pipeline::messaging::InMemoryEventChannel;
//! use order_pipeline::pipeline::OrderPipeline;
//! use order_pipeline::storage::InMemoryOrderStore;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let pipeline = OrderPipeline::new(
//!     Arc::new(InMemoryOrderStore::new()),
//!     Arc::new(InMemoryEventChannel::default()),
//! );
//!
//! let result = pipeline
//!     .ingest(&json!({"Records": [{
//!         "eventSource": "aws:sqs",
//!         "body": "{\"detail\": {\"category\": \"books\", \"amount\": 19.99, \"customerId\": \"CUST001\"}}"
//!     }]}))
//!     .await;
//!
//! assert_eq!(result.status_code, 200);
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib                       # Unit tests
//! DATABASE_URL=postgresql://... cargo test   # Including PostgreSQL-backed tests
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod test_helpers;

pub use config::PipelineConfig;
pub use error::{
    ConfigurationError, PersistenceError, PipelineError, PublishError, Result, UnwrapError,
    ValidationError, ValidationErrorKind,
};
pub use models::{OrderDetail, OrderRecord, OutboundEventEnvelope, Priority, ValidatedDetail};
pub use pipeline::{InvocationResult, OrderPipeline};
