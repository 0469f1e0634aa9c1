//! # Messaging
//!
//! Inbound side: the invocation payload and the tagged [`InboundRecord`]
//! union resolved once at the boundary. Outbound side: the [`EventChannel`]
//! seam with a pgmq-backed implementation and an in-memory one.

pub mod event_channel;
pub mod inbound;
pub mod pgmq_channel;

pub use event_channel::{EventChannel, InMemoryEventChannel, PublishedEvent};
pub use inbound::{InboundBatch, InboundRecord};
pub use pgmq_channel::PgmqEventChannel;
