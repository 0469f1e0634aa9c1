//! End-to-end invocation scenarios against in-memory collaborators

use order_pipeline::error::PublishError;
use order_pipeline::messaging::InMemoryEventChannel;
use order_pipeline::pipeline::{OrderIdStrategy, OrderPipeline};
use order_pipeline::storage::{InMemoryOrderStore, OrderStore};
use order_pipeline::test_helpers::{batch, publish_record, queue_record, topic_record, valid_detail};
use order_pipeline::Priority;
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

fn pipeline() -> (OrderPipeline, Arc<InMemoryOrderStore>, Arc<InMemoryEventChannel>) {
    let store = Arc::new(InMemoryOrderStore::new());
    let channel = Arc::new(InMemoryEventChannel::default());
    (
        OrderPipeline::new(store.clone(), channel.clone()),
        store,
        channel,
    )
}

fn order_ids(body: &serde_json::Value) -> Vec<Uuid> {
    body["orderIds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|id| Uuid::parse_str(id.as_str().unwrap()).unwrap())
        .collect()
}

#[tokio::test]
async fn test_two_record_batch_gets_distinct_ids_and_priorities() {
    let (pipeline, store, _) = pipeline();
    let event = batch(vec![
        queue_record("m-1", valid_detail(json!(600))),
        queue_record("m-2", valid_detail(json!(100))),
    ]);

    let result = pipeline.ingest(&event).await;
    assert_eq!(result.status_code, 200);

    let body = result.body_json().unwrap();
    assert_eq!(body["message"], "Order processed successfully!");
    let ids = order_ids(&body);
    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);

    let first = store.get_order(ids[0]).await.unwrap().unwrap();
    let second = store.get_order(ids[1]).await.unwrap().unwrap();
    assert_eq!(first.priority, Some(Priority::High));
    assert_eq!(second.priority, Some(Priority::Low));
    assert_eq!(first.amount, Decimal::from(600));
}

#[tokio::test]
async fn test_invalid_record_stops_the_batch() {
    let (pipeline, store, _) = pipeline();
    let event = batch(vec![
        queue_record("m-1", json!({"category": "books", "amount": 10, "customerId": "ACME1"})),
        queue_record("m-2", valid_detail(json!(25))),
    ]);

    let result = pipeline.ingest(&event).await;
    assert_eq!(result.status_code, 500);
    let body = result.body_json().unwrap();
    assert_eq!(body["message"], "Error processing order");
    assert_eq!(body["errorCode"], "VALIDATION_ERROR");
    assert!(body["error"].as_str().unwrap().contains("customerId"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_topic_and_queue_origins_store_the_same_order() {
    let (pipeline, store, _) = pipeline();
    let detail = json!({"category": "garden", "amount": "42.50", "customerId": "CUST777"});

    let via_queue = pipeline
        .run_ingest(&batch(vec![queue_record("q-1", detail.clone())]))
        .await
        .unwrap();
    let via_topic = pipeline
        .run_ingest(&batch(vec![topic_record("t-1", detail)]))
        .await
        .unwrap();

    let (queue, topic) = (&via_queue[0], &via_topic[0]);
    assert_ne!(queue.order_id, topic.order_id);
    assert_eq!(queue.category, topic.category);
    assert_eq!(queue.amount, topic.amount);
    assert_eq!(queue.customer_id, topic.customer_id);
    assert_eq!(queue.priority, topic.priority);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_decimal_amount_round_trips_exactly() {
    let (pipeline, store, _) = pipeline();
    let records = pipeline
        .run_ingest(&batch(vec![queue_record("m-1", valid_detail(json!(19.99)))]))
        .await
        .unwrap();

    let stored = store.get_order(records[0].order_id).await.unwrap().unwrap();
    assert_eq!(stored.amount, Decimal::from_str("19.99").unwrap());
    assert_eq!(serde_json::to_value(&stored).unwrap()["amount"], json!("19.99"));
}

#[tokio::test]
async fn test_gateway_post_is_a_single_record_batch() {
    let (pipeline, store, _) = pipeline();
    let event = json!({
        "httpMethod": "POST",
        "body": json!({"detail": valid_detail(json!(750))}).to_string(),
    });

    let result = pipeline.ingest(&event).await;
    assert!(result.is_success());
    assert_eq!(store.len(), 1);
    assert_eq!(store.all()[0].priority, Some(Priority::High));

    let result = pipeline.ingest(&json!({"httpMethod": "GET"})).await;
    assert_eq!(result.status_code, 500);
    assert_eq!(result.body_json().unwrap()["errorCode"], "UNWRAP_ERROR");
}

#[tokio::test]
async fn test_correlation_keyed_ids_ignore_the_origin() {
    let (pipeline, store, _) = pipeline();
    let pipeline = pipeline.with_order_id_strategy(OrderIdStrategy::CorrelationKeyed);
    let detail = valid_detail(json!(80));

    let via_queue = pipeline
        .run_ingest(&batch(vec![queue_record("shared-id", detail.clone())]))
        .await
        .unwrap();
    let via_topic = pipeline
        .run_ingest(&batch(vec![topic_record("shared-id", detail)]))
        .await
        .unwrap();

    assert_eq!(via_queue[0].order_id, via_topic[0].order_id);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_publish_emits_one_event_per_record() {
    let (pipeline, _, channel) = pipeline();
    let mut receiver = channel.subscribe();
    let body = json!({
        "Source": "com.shop.orders",
        "DetailType": "OrderPlaced",
        "EventBusName": "orders-bus",
        "Detail": {"orderId": "abc", "amount": 12},
    });

    let result = pipeline
        .publish(&batch(vec![publish_record("p-1", body.clone()), publish_record("p-2", body)]))
        .await;

    assert_eq!(result.status_code, 200);
    assert_eq!(result.body_json().unwrap(), json!("Event sent successfully"));

    let published = channel.published();
    assert_eq!(published.len(), 2);
    assert_eq!(published[0].event.event_bus_name, "orders-bus");
    assert_eq!(published[0].event.detail_type, "OrderPlaced");
    let detail: serde_json::Value = serde_json::from_str(&published[0].event.detail).unwrap();
    assert_eq!(detail, json!({"orderId": "abc", "amount": 12}));

    let first = receiver.recv().await.unwrap();
    assert_eq!(first.event_id, published[0].event_id);
}

#[tokio::test]
async fn test_publish_missing_bus_name_emits_nothing() {
    let (pipeline, _, channel) = pipeline();
    let body = json!({
        "Source": "com.shop.orders",
        "DetailType": "OrderPlaced",
        "Detail": {"orderId": "abc"},
    });

    let result = pipeline.publish(&batch(vec![publish_record("p-1", body)])).await;

    assert_eq!(result.status_code, 500);
    let body = result.body_json().unwrap();
    assert_eq!(body["message"], "An unexpected error occurred while emitting the event.");
    assert_eq!(body["errorCode"], "MALFORMED_ENVELOPE");
    assert!(body["error"].as_str().unwrap().contains("EventBusName"));
    assert!(channel.published().is_empty());
}

#[tokio::test]
async fn test_malformed_envelope_stops_the_publish_batch() {
    let (pipeline, _, channel) = pipeline();
    let good = json!({
        "Source": "com.shop.orders",
        "DetailType": "OrderPlaced",
        "EventBusName": "orders-bus",
        "Detail": {"orderId": "abc"},
    });
    let malformed = json!({
        "Source": "com.shop.orders",
        "EventBusName": "orders-bus",
        "Detail": {"orderId": "def"},
    });

    let result = pipeline
        .publish(&batch(vec![
            publish_record("p-1", good.clone()),
            publish_record("p-2", malformed),
            publish_record("p-3", good),
        ]))
        .await;

    assert_eq!(result.status_code, 500);
    let body = result.body_json().unwrap();
    assert_eq!(body["errorCode"], "MALFORMED_ENVELOPE");
    assert!(body["error"].as_str().unwrap().contains("DetailType"));

    let published = channel.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].event.detail, json!({"orderId": "abc"}).to_string());
}

#[tokio::test]
async fn test_channel_outage_is_reported_as_retryable_failure() {
    let (pipeline, _, channel) = pipeline();
    channel.fail_with(PublishError::channel_unavailable("connection refused"));
    let body = json!({
        "Source": "s",
        "DetailType": "d",
        "EventBusName": "b",
        "Detail": {},
    });

    let result = pipeline.publish(&batch(vec![publish_record("p-1", body)])).await;
    assert_eq!(result.status_code, 500);
    assert_eq!(result.body_json().unwrap()["errorCode"], "CHANNEL_UNAVAILABLE");
}

#[test]
fn test_validate_and_enrich_invocations_compose() {
    let (pipeline, _, _) = pipeline();
    let envelope = json!({"source": "orders", "detail": valid_detail(json!("500.01"))});

    let validated = pipeline.validate(&envelope);
    assert!(validated.is_success());

    let enriched = pipeline.enrich(envelope);
    assert_eq!(enriched["source"], "orders");
    assert_eq!(enriched["detail"]["priority"], "high-priority");

    let rejected = pipeline.validate(&json!({"detail": valid_detail(json!("0"))}));
    assert_eq!(rejected.status_code, 500);
    let body = rejected.body_json().unwrap();
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["kind"], "invalid_amount");

    let huge = json!({"detail": valid_detail(json!(1e30))});
    assert_eq!(pipeline.enrich(huge.clone())["detail"]["priority"], "high-priority");
    let rejected = pipeline.validate(&huge);
    assert_eq!(rejected.status_code, 500);
    assert_eq!(rejected.body_json().unwrap()["kind"], "amount_out_of_range");
}
