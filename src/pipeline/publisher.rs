use crate::error::PublishError;
use crate::messaging::EventChannel;
use crate::models::OutboundEventEnvelope;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Forwards outbound envelopes onto the injected event channel
///
/// Envelopes are checked before anything is transmitted: a body missing a
/// required field never reaches the channel.
#[derive(Clone)]
pub struct EventPublisher {
    channel: Arc<dyn EventChannel>,
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher")
            .field("channel", &self.channel.channel_name())
            .finish()
    }
}

impl EventPublisher {
    pub fn new(channel: Arc<dyn EventChannel>) -> Self {
        Self { channel }
    }

    /// Publish a decoded `{Source, DetailType, EventBusName, Detail}` body
    pub async fn publish(&self, body: &Value) -> Result<String, PublishError> {
        let envelope = OutboundEventEnvelope::from_body(body)?;
        self.publish_envelope(&envelope).await
    }

    #[instrument(skip(self, envelope), fields(source = %envelope.source, detail_type = %envelope.detail_type))]
    pub async fn publish_envelope(
        &self,
        envelope: &OutboundEventEnvelope,
    ) -> Result<String, PublishError> {
        let event = envelope.to_event()?;
        debug!(event = ?event, "Event to put");

        let event_id = self.channel.put_event(&event).await?;

        info!(
            event_id = %event_id,
            bus = %event.event_bus_name,
            channel = self.channel.channel_name(),
            "Event emitted successfully"
        );
        Ok(event_id)
    }
}
