//! # Identity Assigner
//!
//! Folds a validated detail into an [`OrderRecord`] with a freshly minted
//! `order_id`. Identical input yields distinct ids on every call, so an
//! at-least-once transport that redelivers a record produces a second row.
//! Deployments that need stable ids across redeliveries can opt into
//! [`OrderIdStrategy::CorrelationKeyed`], which derives the id from the
//! order fields plus the transport message id.

use crate::constants::ORDER_ID_NAMESPACE;
use crate::models::{OrderRecord, ValidatedDetail};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderIdStrategy {
    /// Random UUID v4 per call
    #[default]
    Random,
    /// UUID v5 over category, customerId, amount and message id; random when no message id
    CorrelationKeyed,
}

impl std::str::FromStr for OrderIdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "correlation_keyed" => Ok(Self::CorrelationKeyed),
            other => Err(format!("Unknown order id strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityAssigner {
    strategy: OrderIdStrategy,
}

impl IdentityAssigner {
    pub fn new(strategy: OrderIdStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> OrderIdStrategy {
        self.strategy
    }

    /// Build a record with a fresh identifier
    pub fn assign(&self, detail: &ValidatedDetail) -> OrderRecord {
        self.assign_with_correlation(detail, None)
    }

    /// Build a record, keying the identifier on `message_id` when the strategy asks for it
    pub fn assign_with_correlation(
        &self,
        detail: &ValidatedDetail,
        message_id: Option<&str>,
    ) -> OrderRecord {
        let order_id = match (self.strategy, message_id) {
            (OrderIdStrategy::CorrelationKeyed, Some(message_id)) => {
                let amount = detail.amount.normalize().to_string();
                let key = correlation_key(&[
                    detail.category.as_str(),
                    detail.customer_id.as_str(),
                    amount.as_str(),
                    message_id,
                ]);
                Uuid::new_v5(&ORDER_ID_NAMESPACE, key.as_bytes())
            }
            _ => Uuid::new_v4(),
        };

        debug!(order_id = %order_id, strategy = ?self.strategy, "Assigned order id");

        OrderRecord {
            order_id,
            category: detail.category.clone(),
            amount: detail.amount,
            customer_id: detail.customer_id.clone(),
            priority: detail.priority,
        }
    }
}

/// `<len>:<field>` per part, so no field content can shift a boundary
fn correlation_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| format!("{}:{}", part.len(), part))
        .collect::<Vec<_>>()
        .join("|")
}
