//! # Order Models
//!
//! In-flight representations of one order event: the untrusted
//! [`OrderDetail`], the parsed [`ValidatedDetail`], the trusted
//! [`OrderRecord`] that gets persisted, and the [`OutboundEventEnvelope`]
//! forwarded to the event channel.

pub mod envelope;
pub mod order_detail;
pub mod order_record;

pub use envelope::{OutboundEvent, OutboundEventEnvelope};
pub use order_detail::{approximate_amount, parse_amount, OrderDetail, ValidatedDetail};
pub use order_record::{OrderRecord, Priority};
