//! # PostgreSQL Order Store
//!
//! Upserts order records into the configured table. The amount column is
//! `NUMERIC`, so decimals round-trip without binary floating-point drift.

use crate::config::PipelineConfig;
use crate::error::PersistenceError;
use crate::models::{OrderRecord, Priority};
use crate::storage::OrderStore;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Row shape of the orders table
#[derive(Debug, Clone, FromRow)]
struct OrderRow {
    order_id: Uuid,
    category: String,
    amount: Decimal,
    customer_id: String,
    priority: Option<String>,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        let priority = row.priority.as_deref().and_then(|p| match p.parse::<Priority>() {
            Ok(priority) => Some(priority),
            Err(e) => {
                warn!(order_id = %row.order_id, error = %e, "Ignoring unrecognised stored priority");
                None
            }
        });

        OrderRecord {
            order_id: row.order_id,
            category: row.category,
            amount: row.amount,
            customer_id: row.customer_id,
            priority,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
    upsert_sql: String,
    select_sql: String,
}

impl PgOrderStore {
    /// `table_name` must already be a validated SQL identifier (see
    /// `PipelineConfig::validate`); it is interpolated into the statements.
    pub fn new(pool: PgPool, table_name: &str) -> Self {
        let upsert_sql = format!(
            r#"
            INSERT INTO {table_name} (order_id, category, amount, customer_id, priority)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (order_id) DO UPDATE
            SET category = EXCLUDED.category,
                amount = EXCLUDED.amount,
                customer_id = EXCLUDED.customer_id,
                priority = EXCLUDED.priority,
                updated_at = NOW()
            "#
        );
        let select_sql = format!(
            r#"
            SELECT order_id, category, amount, customer_id, priority
            FROM {table_name}
            WHERE order_id = $1
            "#
        );

        Self {
            pool,
            upsert_sql,
            select_sql,
        }
    }

    /// Open a pool sized by the configuration and build a store on the configured table
    pub async fn connect(config: &PipelineConfig) -> Result<Self, PersistenceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;

        debug!(table = %config.table_name, "Connected order store");
        Ok(Self::new(pool, &config.table_name))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[instrument(skip(self, record), fields(order_id = %record.order_id))]
    async fn put_order(&self, record: &OrderRecord) -> Result<(), PersistenceError> {
        sqlx::query(&self.upsert_sql)
            .bind(record.order_id)
            .bind(&record.category)
            .bind(record.amount)
            .bind(&record.customer_id)
            .bind(record.priority.map(|p| p.as_str()))
            .execute(&self.pool)
            .await?;

        debug!("Order row upserted");
        Ok(())
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderRecord>, PersistenceError> {
        let row = sqlx::query_as::<_, OrderRow>(&self.select_sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(OrderRecord::from))
    }

    fn store_name(&self) -> &'static str {
        "postgres"
    }
}
