//! Persistence of instrument records and subscription lookups.

pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::cycle::Cycle;
use crate::models::instrument::InstrumentRecord;

pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),
}

#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Insert or update the record keyed by its symbol.
    async fn upsert(&self, record: &InstrumentRecord) -> Result<(), StoreError>;

    async fn update_funding_interval(&self, symbol: &str, hours: u32) -> Result<(), StoreError>;

    /// Zero non-finite numeric columns and reset saturated RSI values.
    async fn sanitize(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SubscriptionDirectory: Send + Sync {
    /// Chat ids of recipients subscribed to `symbol` on `cycle`.
    async fn subscribers(&self, symbol: &str, cycle: Cycle) -> Result<Vec<String>, StoreError>;
}
