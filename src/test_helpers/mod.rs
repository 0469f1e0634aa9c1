//! Shared fixtures for unit and integration tests.
//!
//! Database-backed tests use the migrator with
//! `#[sqlx::test(migrator = "order_pipeline::test_helpers::MIGRATOR")]`.

use serde_json::{json, Value};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// An order detail that passes validation
pub fn valid_detail(amount: Value) -> Value {
    json!({"category": "electronics", "amount": amount, "customerId": "CUST001"})
}

/// A queue-origin batch record whose body is the JSON text of `{"detail": ..}`
pub fn queue_record(message_id: &str, detail: Value) -> Value {
    json!({
        "messageId": message_id,
        "eventSource": "aws:sqs",
        "body": json!({"detail": detail}).to_string(),
    })
}

/// A topic-origin batch record whose `Sns.Message` is the JSON text of `{"detail": ..}`
pub fn topic_record(message_id: &str, detail: Value) -> Value {
    json!({
        "EventSource": "aws:sns",
        "Sns": {
            "MessageId": message_id,
            "Message": json!({"detail": detail}).to_string(),
        },
    })
}

/// A queue-origin record carrying an outbound publish body
pub fn publish_record(message_id: &str, body: Value) -> Value {
    json!({
        "messageId": message_id,
        "eventSource": "aws:sqs",
        "body": body.to_string(),
    })
}

pub fn batch(records: Vec<Value>) -> Value {
    json!({ "Records": records })
}
