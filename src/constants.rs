//! # Pipeline Constants
//!
//! Fixed design constants and wire-level names shared by the pipeline stages.

use rust_decimal::Decimal;

/// Orders strictly above this amount are high priority; exactly 500 is low
pub const HIGH_PRIORITY_THRESHOLD: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Same threshold for amounts outside the `Decimal` range
pub const HIGH_PRIORITY_THRESHOLD_APPROX: f64 = 500.0;

/// Required keys of an order detail, in validation order
pub const ORDER_REQUIRED_FIELDS: [&str; 3] = ["category", "amount", "customerId"];

/// Literal prefix every customer identifier must carry
pub const CUSTOMER_ID_PREFIX: &str = "CUST";

/// Detail key written by the enricher
pub const PRIORITY_FIELD: &str = "priority";

/// Required keys of an outbound publish body
pub const ENVELOPE_REQUIRED_FIELDS: [&str; 4] = ["Source", "DetailType", "EventBusName", "Detail"];

pub mod status {
    pub const OK: u16 = 200;
    pub const FAILURE: u16 = 500;
}

/// Event-source discriminators carried by inbound batch records
pub mod event_sources {
    pub const QUEUE: &str = "aws:sqs";
    pub const TOPIC: &str = "aws:sns";
}

/// Human-readable messages placed in invocation results
pub mod messages {
    pub const ORDER_PROCESSED: &str = "Order processed successfully!";
    pub const ORDER_FAILED: &str = "Error processing order";
    pub const ORDER_VALIDATED: &str = "Order validated successfully";
    pub const EVENT_SENT: &str = "Event sent successfully";
    pub const EVENT_FAILED: &str = "An unexpected error occurred while emitting the event.";
    pub const VALIDATION_ERROR: &str = "ValidationError";
}

/// Namespace for correlation-keyed order identifiers (UUID v5)
pub const ORDER_ID_NAMESPACE: uuid::Uuid = uuid::Uuid::from_u128(0x6f72_6465_722d_7069_7065_6c69_6e65_2d31);
