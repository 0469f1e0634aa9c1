//! # pgmq Event Channel
//!
//! Publishes outbound events into PostgreSQL message queues (pgmq), one
//! queue per event bus, sharing the pool used by the order store.

use crate::error::PublishError;
use crate::messaging::event_channel::EventChannel;
use crate::models::OutboundEvent;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info, instrument};

/// pgmq caps queue names so that its generated table names stay valid
const MAX_QUEUE_NAME_LENGTH: usize = 47;

#[derive(Debug, Clone)]
pub struct PgmqEventChannel {
    pool: PgPool,
}

impl PgmqEventChannel {
    /// Create a channel using an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Queue backing an event bus: lowercase, `[a-z0-9_]` only
    pub fn queue_name_for(event_bus_name: &str) -> String {
        let mut name: String = event_bus_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        name.truncate(MAX_QUEUE_NAME_LENGTH);
        name
    }

    /// Create the queue for an event bus if it does not exist
    pub async fn ensure_queue(&self, event_bus_name: &str) -> Result<(), PublishError> {
        let queue_name = Self::queue_name_for(event_bus_name);
        debug!(queue = %queue_name, "Ensuring event queue exists");

        sqlx::query("SELECT pgmq.create($1)")
            .bind(&queue_name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl EventChannel for PgmqEventChannel {
    #[instrument(skip(self, event), fields(bus = %event.event_bus_name))]
    async fn put_event(&self, event: &OutboundEvent) -> Result<String, PublishError> {
        let queue_name = Self::queue_name_for(&event.event_bus_name);
        let message = serde_json::to_value(event)?;

        let message_id: i64 = sqlx::query_scalar("SELECT pgmq.send($1, $2)")
            .bind(&queue_name)
            .bind(&message)
            .fetch_one(&self.pool)
            .await?;

        info!(queue = %queue_name, message_id, "Event sent to queue");
        Ok(message_id.to_string())
    }

    fn channel_name(&self) -> &'static str {
        "pgmq"
    }
}
