//! Market data provider interface.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::candle::Candle;
use crate::models::cycle::Cycle;
use crate::models::instrument::{FundingInterval, FundingQuote};

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("symbol {0} is not supported by the data source")]
    SymbolNotSupported(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MarketDataError::Malformed(err.to_string())
        } else {
            MarketDataError::Api(err.to_string())
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Most recent `limit` candles of `symbol` for `cycle`, oldest first.
    async fn get_candles(
        &self,
        symbol: &str,
        cycle: Cycle,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError>;

    async fn get_funding_quote(&self, symbol: &str) -> Result<FundingQuote, MarketDataError>;

    async fn get_funding_intervals(&self) -> Result<Vec<FundingInterval>, MarketDataError>;

    /// Tradable symbols with their last price.
    async fn list_symbols(&self) -> Result<Vec<(String, f64)>, MarketDataError>;
}
