//! # Inbound Envelopes
//!
//! The runtime hands each invocation a batch container. Records arrive from
//! a queue (`body` holds the payload), from a topic (`Sns.Message` holds
//! it) or, for direct gateway calls, as a single `httpMethod`/`body` event.
//! Each record is resolved into one [`InboundRecord`] variant up front, so
//! the rest of the pipeline only ever sees a canonical payload.

use crate::constants::event_sources;
use crate::error::UnwrapError;
use crate::models::OrderDetail;
use serde_json::Value;
use tracing::debug;

/// One record of an inbound batch, tagged by origin
#[derive(Debug, Clone, PartialEq)]
pub enum InboundRecord {
    QueueOrigin {
        message_id: Option<String>,
        body: Value,
    },
    TopicOrigin {
        message_id: Option<String>,
        message: Value,
    },
    GatewayOrigin {
        body: Value,
    },
}

impl InboundRecord {
    /// Resolve a raw batch record into its origin variant
    pub fn resolve(raw: &Value) -> Result<Self, UnwrapError> {
        let discriminator = raw
            .get("EventSource")
            .or_else(|| raw.get("eventSource"))
            .and_then(Value::as_str);

        match discriminator {
            Some(event_sources::QUEUE) => Self::queue_record(raw),
            Some(event_sources::TOPIC) => Self::topic_record(raw),
            Some(other) => Err(UnwrapError::unsupported_source(other)),
            None if raw.get("Sns").is_some() => Self::topic_record(raw),
            None if raw.get("body").is_some() => Self::queue_record(raw),
            None => Err(UnwrapError::unsupported_source("unknown")),
        }
    }

    fn queue_record(raw: &Value) -> Result<Self, UnwrapError> {
        let body = raw
            .get("body")
            .cloned()
            .ok_or_else(|| UnwrapError::missing_path("body"))?;

        Ok(InboundRecord::QueueOrigin {
            message_id: raw
                .get("messageId")
                .and_then(Value::as_str)
                .map(str::to_string),
            body,
        })
    }

    fn topic_record(raw: &Value) -> Result<Self, UnwrapError> {
        let sns = raw
            .get("Sns")
            .ok_or_else(|| UnwrapError::missing_path("Sns"))?;
        let message = sns
            .get("Message")
            .cloned()
            .ok_or_else(|| UnwrapError::missing_path("Sns.Message"))?;

        Ok(InboundRecord::TopicOrigin {
            message_id: sns
                .get("MessageId")
                .and_then(Value::as_str)
                .map(str::to_string),
            message,
        })
    }

    /// Transport-assigned message id, when the origin supplies one
    pub fn message_id(&self) -> Option<&str> {
        match self {
            InboundRecord::QueueOrigin { message_id, .. }
            | InboundRecord::TopicOrigin { message_id, .. } => message_id.as_deref(),
            InboundRecord::GatewayOrigin { .. } => None,
        }
    }

    pub fn origin(&self) -> &'static str {
        match self {
            InboundRecord::QueueOrigin { .. } => "queue",
            InboundRecord::TopicOrigin { .. } => "topic",
            InboundRecord::GatewayOrigin { .. } => "gateway",
        }
    }

    /// The JSON-decoded payload carried by the record
    ///
    /// A payload without `detail` that wraps another `body` is unwrapped
    /// one more level.
    pub fn payload(&self) -> Result<Value, UnwrapError> {
        let (raw, location) = match self {
            InboundRecord::QueueOrigin { body, .. } => (body, "body"),
            InboundRecord::TopicOrigin { message, .. } => (message, "Sns.Message"),
            InboundRecord::GatewayOrigin { body } => (body, "body"),
        };

        let payload = decode(raw, location)?;

        if payload.get("detail").is_none() {
            if let Some(inner) = payload.get("body") {
                return decode(inner, "body.body");
            }
        }

        Ok(payload)
    }

    /// The order detail nested under the payload's `detail` key
    pub fn order_detail(&self) -> Result<OrderDetail, UnwrapError> {
        let payload = self.payload()?;
        let detail = payload
            .get("detail")
            .cloned()
            .ok_or_else(|| UnwrapError::missing_path("detail"))?;

        OrderDetail::from_value(detail).ok_or_else(|| UnwrapError::unexpected_shape("detail", "object"))
    }
}

fn decode(raw: &Value, location: &str) -> Result<Value, UnwrapError> {
    match raw {
        Value::String(text) => {
            serde_json::from_str(text).map_err(|e| UnwrapError::invalid_json(location, &e))
        }
        other => Ok(other.clone()),
    }
}

/// Ordered records of one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundBatch {
    pub records: Vec<InboundRecord>,
}

impl InboundBatch {
    /// Resolve an invocation event into a batch
    ///
    /// `Records` containers keep delivery order; a gateway call becomes a
    /// single-record batch.
    pub fn from_invocation(event: &Value) -> Result<Self, UnwrapError> {
        if let Some(records) = event.get("Records") {
            let records = records
                .as_array()
                .ok_or_else(|| UnwrapError::unexpected_shape("Records", "array"))?
                .iter()
                .map(InboundRecord::resolve)
                .collect::<Result<Vec<_>, _>>()?;

            debug!(record_count = records.len(), "Resolved inbound batch");
            return Ok(Self { records });
        }

        if let Some(method) = event.get("httpMethod").and_then(Value::as_str) {
            if !method.eq_ignore_ascii_case("POST") {
                return Err(UnwrapError::unsupported_source(format!("gateway {method}")));
            }
            let body = event
                .get("body")
                .cloned()
                .ok_or_else(|| UnwrapError::missing_path("body"))?;

            debug!("Resolved gateway invocation");
            return Ok(Self {
                records: vec![InboundRecord::GatewayOrigin { body }],
            });
        }

        Err(UnwrapError::unsupported_source("unknown"))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
