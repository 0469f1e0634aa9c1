use crate::constants::PRIORITY_FIELD;
use crate::models::order_record::Priority;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Untrusted order detail exactly as unwrapped from an inbound envelope
///
/// Keys are kept verbatim so the validate-only invocation can hand the
/// detail back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderDetail(Map<String, Value>);

impl OrderDetail {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a detail from any JSON value; non-objects are rejected
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Amount as an exact decimal, if present and numeric
    pub fn amount(&self) -> Option<Decimal> {
        self.get("amount").and_then(parse_amount)
    }

    /// Amount as a float, for comparisons on values `Decimal` cannot hold
    pub fn approximate_amount(&self) -> Option<f64> {
        self.get("amount").and_then(approximate_amount)
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for OrderDetail {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// Parse an amount from its textual form so currency values keep their exact digits
///
/// Accepts JSON numbers and numeric strings, including exponent notation.
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Numeric reading of an amount that may lie outside the `Decimal` range
///
/// Only for sign and threshold comparisons; records carry the exact value
/// from [`parse_amount`].
pub fn approximate_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    amount.is_finite().then_some(amount)
}

/// Detail whose required fields are present and typed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDetail {
    pub category: String,
    pub amount: Decimal,
    pub customer_id: String,
    pub priority: Option<Priority>,
    detail: OrderDetail,
}

impl ValidatedDetail {
    pub(crate) fn new(
        category: String,
        amount: Decimal,
        customer_id: String,
        detail: OrderDetail,
    ) -> Self {
        let priority = detail
            .str_field(PRIORITY_FIELD)
            .and_then(|p| p.parse::<Priority>().ok());

        Self {
            category,
            amount,
            customer_id,
            priority,
            detail,
        }
    }

    /// Set the priority on both the typed view and the underlying detail
    pub(crate) fn set_priority(&mut self, priority: Priority) {
        self.detail
            .insert(PRIORITY_FIELD, Value::String(priority.as_str().to_string()));
        self.priority = Some(priority);
    }

    /// The detail as received (plus any enrichment)
    pub fn detail(&self) -> &OrderDetail {
        &self.detail
    }

    pub fn into_detail(self) -> OrderDetail {
        self.detail
    }
}
