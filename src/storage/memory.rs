use crate::error::PersistenceError;
use crate::models::OrderRecord;
use crate::storage::OrderStore;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

/// DashMap-backed store with optional failure injection
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    orders: DashMap<Uuid, OrderRecord>,
    failure: Mutex<Option<PersistenceError>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with `error`
    pub fn fail_with(&self, error: PersistenceError) {
        *self.failure.lock() = Some(error);
    }

    pub fn clear_failure(&self) {
        *self.failure.lock() = None;
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn all(&self) -> Vec<OrderRecord> {
        self.orders.iter().map(|entry| entry.value().clone()).collect()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn put_order(&self, record: &OrderRecord) -> Result<(), PersistenceError> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }

        self.orders.insert(record.order_id, record.clone());
        Ok(())
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderRecord>, PersistenceError> {
        Ok(self.orders.get(&order_id).map(|entry| entry.value().clone()))
    }

    fn store_name(&self) -> &'static str {
        "in_memory"
    }
}
