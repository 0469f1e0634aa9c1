//! # Validator
//!
//! Rejects structurally or semantically invalid order details. Checks run
//! in a fixed order and stop at the first failure:
//!
//! 1. `category`, `amount` and `customerId` are all present
//! 2. `amount` is numeric and strictly positive; positive amounts that do
//!    not fit an exact decimal are rejected separately
//! 3. `customerId` is a string starting with `CUST`
//! 4. `category` is a string

use crate::constants::{CUSTOMER_ID_PREFIX, ORDER_REQUIRED_FIELDS};
use crate::error::{PipelineError, ValidationError};
use crate::models::{OrderDetail, ValidatedDetail};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a detail; deterministic and free of side effects
    pub fn validate(&self, detail: &OrderDetail) -> Result<ValidatedDetail, ValidationError> {
        let missing: Vec<String> = ORDER_REQUIRED_FIELDS
            .iter()
            .filter(|key| !detail.contains(key))
            .map(|key| key.to_string())
            .collect();

        if !missing.is_empty() {
            warn!(missing = ?missing, "Order detail is missing required keys");
            return Err(ValidationError::missing_fields(missing));
        }

        let amount = match detail.amount() {
            Some(amount) if amount > Decimal::ZERO => amount,
            None if detail.approximate_amount().is_some_and(|a| a > 0.0) => {
                warn!(amount = ?detail.get("amount"), "Order amount is outside the exact decimal range");
                return Err(ValidationError::amount_out_of_range());
            }
            _ => {
                warn!(amount = ?detail.get("amount"), "Order amount is not a positive number");
                return Err(ValidationError::invalid_amount());
            }
        };

        let customer_id = match detail.get("customerId") {
            Some(Value::String(id)) if id.starts_with(CUSTOMER_ID_PREFIX) => id.clone(),
            other => {
                warn!(customer_id = ?other, "Order customerId is malformed");
                return Err(ValidationError::invalid_customer_id());
            }
        };

        let category = match detail.get("category") {
            Some(Value::String(category)) => category.clone(),
            other => {
                warn!(category = ?other, "Order category is not a string");
                return Err(ValidationError::invalid_category());
            }
        };

        debug!(customer_id = %customer_id, "Validation passed for order detail");
        Ok(ValidatedDetail::new(
            category,
            amount,
            customer_id,
            detail.clone(),
        ))
    }

    /// Typed extraction without the semantic checks
    ///
    /// Used when an ingest deployment does not wire validation in; fields
    /// that are absent or of the wrong type still cannot become a record.
    pub fn extract_structure(&self, detail: &OrderDetail) -> Result<ValidatedDetail, PipelineError> {
        let category = detail
            .str_field("category")
            .ok_or_else(|| PipelineError::malformed_detail("'category' must be a string"))?;
        let amount = detail
            .amount()
            .ok_or_else(|| PipelineError::malformed_detail("'amount' must be numeric"))?;
        let customer_id = detail
            .str_field("customerId")
            .ok_or_else(|| PipelineError::malformed_detail("'customerId' must be a string"))?;

        Ok(ValidatedDetail::new(
            category.to_string(),
            amount,
            customer_id.to_string(),
            detail.clone(),
        ))
    }
}
