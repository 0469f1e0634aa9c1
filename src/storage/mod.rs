//! # Order Storage
//!
//! Durable storage seam for finalized order records. Writes are keyed by
//! `order_id` and overwrite any prior value for the same id; a record is
//! either fully stored or not stored at all.

pub mod memory;
pub mod postgres;

use crate::error::PersistenceError;
use crate::models::OrderRecord;
use async_trait::async_trait;
use uuid::Uuid;

pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Write a record, overwriting any record with the same `order_id`
    async fn put_order(&self, record: &OrderRecord) -> Result<(), PersistenceError>;

    async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderRecord>, PersistenceError>;

    fn store_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
