use crate::constants::{messages, status};
use crate::error::ValidationError;
use crate::pipeline::error_classifier::ErrorClassification;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

/// Result envelope handed back to the invoking runtime
///
/// `body` is JSON-encoded text, as the runtime expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    pub status_code: u16,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl InvocationResult {
    fn new(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            body: body.to_string(),
            detail: None,
        }
    }

    pub fn ingest_succeeded(order_ids: &[Uuid]) -> Self {
        Self::new(
            status::OK,
            json!({"message": messages::ORDER_PROCESSED, "orderIds": order_ids}),
        )
    }

    pub fn ingest_failed(classification: &ErrorClassification) -> Self {
        Self::new(
            status::FAILURE,
            json!({
                "message": messages::ORDER_FAILED,
                "error": classification.error_message,
                "errorCode": classification.error_code,
            }),
        )
    }

    pub fn publish_succeeded() -> Self {
        Self::new(status::OK, json!(messages::EVENT_SENT))
    }

    pub fn publish_failed(classification: &ErrorClassification) -> Self {
        Self::new(
            status::FAILURE,
            json!({
                "message": messages::EVENT_FAILED,
                "error": classification.error_message,
                "errorCode": classification.error_code,
            }),
        )
    }

    pub fn validation_succeeded(detail: Value) -> Self {
        Self {
            detail: Some(detail),
            ..Self::new(status::OK, json!(messages::ORDER_VALIDATED))
        }
    }

    pub fn validation_failed(error: &ValidationError) -> Self {
        Self::new(
            status::FAILURE,
            json!({
                "error": messages::VALIDATION_ERROR,
                "cause": error.cause,
                "kind": error.kind,
                "fields": error.fields,
            }),
        )
    }

    pub fn is_success(&self) -> bool {
        self.status_code == status::OK
    }

    /// Decode `body` back into JSON
    pub fn body_json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}
