use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Priority classification derived by the enricher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "high-priority")]
    High,
    #[serde(rename = "low-priority")]
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high-priority",
            Priority::Low => "low-priority",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high-priority" => Ok(Priority::High),
            "low-priority" => Ok(Priority::Low),
            other => Err(format!("Unknown priority: {other}")),
        }
    }
}

/// Trusted, pipeline-internal order
///
/// `order_id` is assigned once by the identity assigner and never changes.
/// Maps to the configured orders table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: Uuid,
    pub category: String,
    pub amount: Decimal,
    pub customer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_priority_wire_names() {
        assert_eq!(json!(Priority::High), json!("high-priority"));
        assert_eq!("low-priority".parse::<Priority>(), Ok(Priority::Low));
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_record_serializes_amount_exactly() {
        let record = OrderRecord {
            order_id: Uuid::nil(),
            category: "books".to_string(),
            amount: Decimal::new(1999, 2),
            customer_id: "CUST001".to_string(),
            priority: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["amount"], json!("19.99"));
        assert_eq!(value["customerId"], json!("CUST001"));
        assert!(value.get("priority").is_none());
    }
}
