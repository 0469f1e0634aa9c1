//! # Enricher
//!
//! Derives the priority classification of an order. Total: a missing or
//! non-numeric amount counts as zero, so the stage can run standalone
//! without validation upstream. Amounts too large for `Decimal` are
//! compared as floats.

use crate::constants::{HIGH_PRIORITY_THRESHOLD, HIGH_PRIORITY_THRESHOLD_APPROX, PRIORITY_FIELD};
use crate::models::{OrderDetail, Priority, ValidatedDetail};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct Enricher;

impl Enricher {
    pub fn new() -> Self {
        Self
    }

    /// High priority strictly above the threshold
    pub fn priority_for(&self, amount: Decimal) -> Priority {
        if amount > HIGH_PRIORITY_THRESHOLD {
            Priority::High
        } else {
            Priority::Low
        }
    }

    /// Add or overwrite `priority`; every other field passes through
    pub fn enrich(&self, mut detail: OrderDetail) -> OrderDetail {
        let priority = match detail.amount() {
            Some(amount) => self.priority_for(amount),
            None => match detail.approximate_amount() {
                Some(amount) if amount > HIGH_PRIORITY_THRESHOLD_APPROX => Priority::High,
                _ => Priority::Low,
            },
        };
        detail.insert(PRIORITY_FIELD, Value::String(priority.as_str().to_string()));

        debug!(priority = %priority, "Enriched order detail");
        detail
    }

    pub fn enrich_validated(&self, mut validated: ValidatedDetail) -> ValidatedDetail {
        let priority = self.priority_for(validated.amount);
        validated.set_priority(priority);

        debug!(priority = %priority, customer_id = %validated.customer_id, "Enriched validated order");
        validated
    }

    /// Enrich the `detail` of a whole invocation envelope, keeping its shape
    ///
    /// A missing `detail` is treated as empty. Envelopes that are not JSON
    /// objects, or whose `detail` is not one, are returned untouched.
    pub fn enrich_envelope(&self, mut event: Value) -> Value {
        let Some(envelope) = event.as_object_mut() else {
            warn!("Enrichment envelope is not a JSON object; passing through");
            return event;
        };

        let detail = match envelope.remove("detail") {
            None | Some(Value::Null) => OrderDetail::new(Map::new()),
            Some(Value::Object(map)) => OrderDetail::new(map),
            Some(other) => {
                warn!("Enrichment envelope detail is not a JSON object; passing through");
                envelope.insert("detail".to_string(), other);
                return event;
            }
        };

        envelope.insert("detail".to_string(), self.enrich(detail).into_value());
        event
    }
}
