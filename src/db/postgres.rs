//! PostgreSQL-backed registry store and subscription directory

use async_trait::async_trait;
use tokio_postgres::{Client, NoTls};
use tracing::{error, info, warn};

use super::{RegistryStore, StoreError, SubscriptionDirectory};
use crate::models::cycle::Cycle;
use crate::models::instrument::InstrumentRecord;

/// Numeric columns cleared by [`RegistryStore::sanitize`].
pub const SANITIZED_COLUMNS: [&str; 7] = [
    "price",
    "volume",
    "taker_buy_volume",
    "taker_buy_ratio",
    "rsi",
    "rate",
    "change",
];

/// Insert or update one `symbol_records` row, funding interval included.
pub const UPSERT_RECORD_SQL: &str = "INSERT INTO symbol_records
        (symbol, price, change, volume, taker_buy_volume, taker_buy_ratio, rsi, rate, rate_cycle, updated_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
     ON CONFLICT (symbol) DO UPDATE SET
        price = EXCLUDED.price,
        change = EXCLUDED.change,
        volume = EXCLUDED.volume,
        taker_buy_volume = EXCLUDED.taker_buy_volume,
        taker_buy_ratio = EXCLUDED.taker_buy_ratio,
        rsi = EXCLUDED.rsi,
        rate = EXCLUDED.rate,
        rate_cycle = EXCLUDED.rate_cycle,
        updated_at = NOW()";

/// RSI values at or above this are treated as saturated.
pub const SATURATED_RSI: f64 = 99.99;

pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgresStore: connection error");
            }
        });

        let store = Self { client };
        store.init_schema().await?;
        info!("PostgresStore: connected");

        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        self.client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS symbol_records (
                    symbol TEXT PRIMARY KEY,
                    price DOUBLE PRECISION NOT NULL DEFAULT 0,
                    change DOUBLE PRECISION NOT NULL DEFAULT 0,
                    volume DOUBLE PRECISION NOT NULL DEFAULT 0,
                    taker_buy_volume DOUBLE PRECISION NOT NULL DEFAULT 0,
                    taker_buy_ratio DOUBLE PRECISION NOT NULL DEFAULT 0,
                    rsi DOUBLE PRECISION NOT NULL DEFAULT 0,
                    rate DOUBLE PRECISION NOT NULL DEFAULT 0,
                    rate_cycle INTEGER NOT NULL DEFAULT 0,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
                CREATE TABLE IF NOT EXISTS user_info (
                    id BIGSERIAL PRIMARY KEY,
                    telegram_id TEXT
                );
                CREATE TABLE IF NOT EXISTS subscription (
                    id BIGSERIAL PRIMARY KEY,
                    user_id BIGINT NOT NULL REFERENCES user_info(id),
                    symbol TEXT NOT NULL,
                    cycle TEXT NOT NULL
                );",
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RegistryStore for PostgresStore {
    async fn upsert(&self, record: &InstrumentRecord) -> Result<(), StoreError> {
        let rate_cycle = i32::try_from(record.funding_interval_hours).unwrap_or(i32::MAX);
        self.client
            .execute(
                UPSERT_RECORD_SQL,
                &[
                    &record.symbol,
                    &record.price,
                    &record.change,
                    &record.volume,
                    &record.taker_buy_volume,
                    &record.taker_buy_ratio,
                    &record.rsi,
                    &record.funding_rate,
                    &rate_cycle,
                ],
            )
            .await?;
        Ok(())
    }

    async fn update_funding_interval(&self, symbol: &str, hours: u32) -> Result<(), StoreError> {
        let hours = i32::try_from(hours).unwrap_or(i32::MAX);
        self.client
            .execute(
                "UPDATE symbol_records SET rate_cycle = $2 WHERE symbol = $1",
                &[&symbol, &hours],
            )
            .await?;
        Ok(())
    }

    async fn sanitize(&self) -> Result<(), StoreError> {
        for column in SANITIZED_COLUMNS {
            // NaN is the only value not equal to itself.
            let sql = format!(
                "UPDATE symbol_records SET {col} = 0 \
                 WHERE {col} <> {col} OR {col} = 'Infinity'::float8 OR {col} = '-Infinity'::float8",
                col = column
            );
            if let Err(e) = self.client.execute(sql.as_str(), &[]).await {
                warn!(column = column, error = %e, "PostgresStore: failed to sanitize column {}", column);
            }
        }

        let reset = self
            .client
            .execute(
                "UPDATE symbol_records SET rsi = 50 WHERE rsi >= $1",
                &[&SATURATED_RSI],
            )
            .await?;

        info!(rsi_reset = reset, "PostgresStore: sanitize sweep completed");
        Ok(())
    }
}

#[async_trait]
impl SubscriptionDirectory for PostgresStore {
    async fn subscribers(&self, symbol: &str, cycle: Cycle) -> Result<Vec<String>, StoreError> {
        let symbol = symbol.trim().to_uppercase();
        let rows = self
            .client
            .query(
                "SELECT u.telegram_id FROM user_info u
                 JOIN subscription s ON s.user_id = u.id
                 WHERE s.symbol = $1 AND s.cycle = $2
                   AND u.telegram_id IS NOT NULL AND TRIM(u.telegram_id) <> ''",
                &[&symbol, &cycle.as_str()],
            )
            .await?;

        Ok(rows
            .iter()
            .filter_map(|row| row.get::<_, Option<String>>(0))
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect())
    }
}
