use crate::error::PublishError;
use crate::models::OutboundEvent;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

/// Outbound event bus seam
///
/// One call transmits exactly one event. Implementations issue a single
/// attempt and report the outcome; retry policy belongs to the caller's
/// runtime.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Transmit one event and return the channel-assigned event id
    async fn put_event(&self, event: &OutboundEvent) -> Result<String, PublishError>;

    fn channel_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Event accepted by the in-memory channel
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub event_id: String,
    pub event: OutboundEvent,
    pub published_at: chrono::DateTime<chrono::Utc>,
}

/// In-process event channel with broadcast subscribers and a replayable log
///
/// Used by tests and by the CLI harness when no database is configured.
#[derive(Debug)]
pub struct InMemoryEventChannel {
    sender: broadcast::Sender<PublishedEvent>,
    published: Mutex<Vec<PublishedEvent>>,
    next_id: AtomicU64,
    failure: Mutex<Option<PublishError>>,
}

impl InMemoryEventChannel {
    /// Create a new channel with the specified broadcast capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            failure: Mutex::new(None),
        }
    }

    /// Make every subsequent publish fail with `error`
    pub fn fail_with(&self, error: PublishError) {
        *self.failure.lock() = Some(error);
    }

    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.sender.subscribe()
    }

    /// Snapshot of everything published so far, in publish order
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.published.lock().clone()
    }
}

impl Default for InMemoryEventChannel {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl EventChannel for InMemoryEventChannel {
    async fn put_event(&self, event: &OutboundEvent) -> Result<String, PublishError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }

        let published = PublishedEvent {
            event_id: format!("mem-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            event: event.clone(),
            published_at: chrono::Utc::now(),
        };

        self.published.lock().push(published.clone());

        // No subscribers is fine; the log above still records the event
        let _ = self.sender.send(published.clone());

        Ok(published.event_id)
    }

    fn channel_name(&self) -> &'static str {
        "in_memory"
    }
}
