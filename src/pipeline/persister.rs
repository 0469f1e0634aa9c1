use crate::error::PersistenceError;
use crate::models::OrderRecord;
use crate::storage::OrderStore;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Writes finalized records to the injected order store
///
/// Single-shot: the persister never retries. A transient failure is
/// surfaced so the runtime can redeliver the whole invocation.
#[derive(Clone)]
pub struct Persister {
    store: Arc<dyn OrderStore>,
}

impl std::fmt::Debug for Persister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persister")
            .field("store", &self.store.store_name())
            .finish()
    }
}

impl Persister {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, record), fields(order_id = %record.order_id, store = self.store.store_name()))]
    pub async fn persist(&self, record: &OrderRecord) -> Result<(), PersistenceError> {
        match self.store.put_order(record).await {
            Ok(()) => {
                info!(
                    customer_id = %record.customer_id,
                    amount = %record.amount,
                    "Order persisted"
                );
                Ok(())
            }
            Err(err @ PersistenceError::StoreUnavailable { .. }) => {
                warn!(error = %err, "Order store unavailable");
                Err(err)
            }
            Err(err) => {
                error!(error = %err, record = ?record, "Order persistence failed");
                Err(err)
            }
        }
    }
}
