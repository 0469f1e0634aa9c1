//! # Order Pipeline Orchestration
//!
//! Composes the stages into the invocations the runtime calls:
//!
//! - **ingest**: unwrap → (validate) → (enrich) → assign identity → persist
//! - **publish**: unwrap → build outbound envelope → publish
//! - **validate**: validator alone, returning the detail or a structured failure
//! - **enrich**: enricher alone, returning the envelope with `detail.priority`
//!
//! Batches are processed strictly in delivery order, one record at a time.
//! The first failure aborts the rest of the invocation; there is no
//! partial-success reporting. Errors are classified and converted into an
//! [`InvocationResult`] at the outermost boundary, never propagated raw.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result, ValidationError};
use crate::logging::{log_error, log_stage_operation};
use crate::messaging::{EventChannel, InboundBatch, InboundRecord};
use crate::models::{OrderDetail, OrderRecord, ValidatedDetail};
use crate::pipeline::enricher::Enricher;
use crate::pipeline::error_classifier::{
    ErrorClassification, ErrorClassifier, StandardErrorClassifier,
};
use crate::pipeline::identity::{IdentityAssigner, OrderIdStrategy};
use crate::pipeline::persister::Persister;
use crate::pipeline::publisher::EventPublisher;
use crate::pipeline::response::InvocationResult;
use crate::pipeline::validator::Validator;
use crate::storage::OrderStore;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Optional stages wired in front of identity assignment in the ingest variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestStages {
    pub validate: bool,
    pub enrich: bool,
}

impl Default for IngestStages {
    fn default() -> Self {
        Self {
            validate: true,
            enrich: true,
        }
    }
}

impl IngestStages {
    /// Unwrap, assign and persist only
    pub fn persist_only() -> Self {
        Self {
            validate: false,
            enrich: false,
        }
    }
}

/// The order-event pipeline with its injected store and event channel
///
/// Holds no mutable state of its own; one instance can serve concurrent
/// invocations.
#[derive(Clone)]
pub struct OrderPipeline {
    validator: Validator,
    enricher: Enricher,
    identity: IdentityAssigner,
    persister: Persister,
    publisher: EventPublisher,
    classifier: Arc<dyn ErrorClassifier>,
    stages: IngestStages,
}

impl std::fmt::Debug for OrderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderPipeline")
            .field("identity", &self.identity)
            .field("persister", &self.persister)
            .field("publisher", &self.publisher)
            .field("classifier", &self.classifier.classifier_name())
            .field("stages", &self.stages)
            .finish()
    }
}

impl OrderPipeline {
    pub fn new(store: Arc<dyn OrderStore>, channel: Arc<dyn EventChannel>) -> Self {
        Self {
            validator: Validator::new(),
            enricher: Enricher::new(),
            identity: IdentityAssigner::default(),
            persister: Persister::new(store),
            publisher: EventPublisher::new(channel),
            classifier: Arc::new(StandardErrorClassifier::new()),
            stages: IngestStages::default(),
        }
    }

    pub fn from_config(
        config: &PipelineConfig,
        store: Arc<dyn OrderStore>,
        channel: Arc<dyn EventChannel>,
    ) -> Self {
        Self::new(store, channel)
            .with_stages(config.ingest_stages)
            .with_order_id_strategy(config.order_id_strategy)
    }

    pub fn with_stages(mut self, stages: IngestStages) -> Self {
        self.stages = stages;
        self
    }

    pub fn with_order_id_strategy(mut self, strategy: OrderIdStrategy) -> Self {
        self.identity = IdentityAssigner::new(strategy);
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn stages(&self) -> IngestStages {
        self.stages
    }

    /// Ingest a batch, returning the persisted records in delivery order
    #[instrument(skip(self, event), fields(stages = ?self.stages))]
    pub async fn run_ingest(&self, event: &Value) -> Result<Vec<OrderRecord>> {
        let batch = InboundBatch::from_invocation(event)?;
        info!(record_count = batch.len(), "Ingesting order batch");

        let mut persisted = Vec::with_capacity(batch.len());
        for record in &batch.records {
            persisted.push(self.ingest_record(record).await?);
        }

        Ok(persisted)
    }

    async fn ingest_record(&self, inbound: &InboundRecord) -> Result<OrderRecord> {
        let detail = inbound.order_detail()?;

        let validated = if self.stages.validate {
            self.validator.validate(&detail)?
        } else {
            self.validator.extract_structure(&detail)?
        };

        let validated = if self.stages.enrich {
            self.enricher.enrich_validated(validated)
        } else {
            validated
        };

        let record = self
            .identity
            .assign_with_correlation(&validated, inbound.message_id());
        let order_id = record.order_id.to_string();
        log_stage_operation("assign", Some(&order_id), "assigned", Some(inbound.origin()));

        self.persister.persist(&record).await?;
        log_stage_operation("persist", Some(&order_id), "persisted", None);

        Ok(record)
    }

    /// Ingest invocation: always yields a result envelope
    pub async fn ingest(&self, event: &Value) -> InvocationResult {
        match self.guarded("ingest", self.run_ingest(event)).await {
            Ok(records) => {
                let order_ids: Vec<_> = records.iter().map(|r| r.order_id).collect();
                InvocationResult::ingest_succeeded(&order_ids)
            }
            Err(error) => InvocationResult::ingest_failed(&self.report("ingest", &error)),
        }
    }

    /// Publish every envelope of a batch, returning the channel event ids
    #[instrument(skip(self, event))]
    pub async fn run_publish(&self, event: &Value) -> Result<Vec<String>> {
        let batch = InboundBatch::from_invocation(event)?;
        info!(record_count = batch.len(), "Publishing event batch");

        let mut event_ids = Vec::with_capacity(batch.len());
        for record in &batch.records {
            let body = record.payload()?;
            let event_id = self.publisher.publish(&body).await?;
            log_stage_operation("publish", None, "emitted", Some(&event_id));
            event_ids.push(event_id);
        }

        Ok(event_ids)
    }

    /// Publish invocation: always yields a result envelope
    pub async fn publish(&self, event: &Value) -> InvocationResult {
        match self.guarded("publish", self.run_publish(event)).await {
            Ok(_) => InvocationResult::publish_succeeded(),
            Err(error) => InvocationResult::publish_failed(&self.report("publish", &error)),
        }
    }

    /// Validate the `detail` of a single envelope, for orchestrators to branch on
    pub fn validate_event(&self, event: &Value) -> std::result::Result<ValidatedDetail, ValidationError> {
        self.validator.validate(&detail_of(event))
    }

    /// Validate-only invocation
    pub fn validate(&self, event: &Value) -> InvocationResult {
        match self.validate_event(event) {
            Ok(validated) => {
                log_stage_operation("validate", None, "passed", None);
                InvocationResult::validation_succeeded(validated.into_detail().into_value())
            }
            Err(error) => {
                self.report("validate", &error.clone().into());
                InvocationResult::validation_failed(&error)
            }
        }
    }

    /// Enrich-only invocation: the envelope comes back with `detail.priority`
    pub fn enrich(&self, event: Value) -> Value {
        let enriched = self.enricher.enrich_envelope(event);
        log_stage_operation("enrich", None, "enriched", None);
        enriched
    }

    /// Convert a panic inside a stage or an injected collaborator into an error
    async fn guarded<T, F>(&self, operation: &str, future: F) -> Result<T>
    where
        F: std::future::Future<Output = Result<T>>,
    {
        match AssertUnwindSafe(future).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                warn!(operation = %operation, "Invocation panicked");
                Err(PipelineError::internal(format!("{operation} panicked: {message}")))
            }
        }
    }

    fn report(&self, operation: &str, error: &PipelineError) -> ErrorClassification {
        let classification = self.classifier.classify_error(error);
        let context = format!(
            "category={} retryable={} code={}",
            classification.error_category, classification.is_retryable, classification.error_code
        );
        log_error("order_pipeline", operation, &error.to_string(), Some(&context));
        classification
    }
}

/// The `detail` mapping of a validation/enrichment envelope; absent or non-object counts as empty
fn detail_of(event: &Value) -> OrderDetail {
    event
        .get("detail")
        .cloned()
        .and_then(OrderDetail::from_value)
        .unwrap_or_else(|| OrderDetail::new(Map::new()))
}
