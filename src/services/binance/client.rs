//! Binance USDⓈ-M futures REST client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use super::types::{parse_kline, FundingInfo, PremiumIndex, RawKline, TickerPrice};
use crate::models::candle::Candle;
use crate::models::cycle::Cycle;
use crate::models::instrument::{FundingInterval, FundingQuote};
use crate::services::market_data::{MarketDataError, MarketDataProvider};

pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

#[derive(Clone)]
pub struct BinanceFuturesClient {
    http: Client,
    base_url: String,
}

impl BinanceFuturesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, MarketDataError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let resp = self.http.get(self.url(path)).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MarketDataError::Api(format!(
                "GET {} returned status {}",
                path, status
            )));
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| MarketDataError::Malformed(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl MarketDataProvider for BinanceFuturesClient {
    #[instrument(skip(self), fields(cycle = %cycle), level = "debug")]
    async fn get_candles(
        &self,
        symbol: &str,
        cycle: Cycle,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", cycle.as_str().to_string()),
            ("limit", limit.to_string()),
        ];

        let resp = self
            .http
            .get(self.url("/fapi/v1/klines"))
            .query(&query)
            .send()
            .await?;

        match resp.status() {
            StatusCode::BAD_REQUEST => {
                return Err(MarketDataError::SymbolNotSupported(symbol.to_string()))
            }
            status if !status.is_success() => {
                return Err(MarketDataError::Api(format!(
                    "klines for {} returned status {}",
                    symbol, status
                )))
            }
            _ => {}
        }

        let body = resp.text().await?;
        let rows: Vec<RawKline> = serde_json::from_str(&body)
            .map_err(|e| MarketDataError::Malformed(format!("klines for {}: {}", symbol, e)))?;

        let candles = rows.iter().map(parse_kline).collect::<Result<Vec<_>, _>>()?;
        debug!(symbol = %symbol, count = candles.len(), "BinanceFuturesClient: fetched {} klines for {}", candles.len(), symbol);

        Ok(candles)
    }

    async fn get_funding_quote(&self, symbol: &str) -> Result<FundingQuote, MarketDataError> {
        let index: PremiumIndex = self
            .get_json("/fapi/v1/premiumIndex", &[("symbol", symbol.to_string())])
            .await?;
        FundingQuote::try_from(index)
    }

    async fn get_funding_intervals(&self) -> Result<Vec<FundingInterval>, MarketDataError> {
        let infos: Vec<FundingInfo> = self.get_json("/fapi/v1/fundingInfo", &[]).await?;
        Ok(infos.into_iter().map(FundingInterval::from).collect())
    }

    async fn list_symbols(&self) -> Result<Vec<(String, f64)>, MarketDataError> {
        let tickers: Vec<TickerPrice> = self.get_json("/fapi/v1/ticker/price", &[]).await?;

        let mut listing = Vec::with_capacity(tickers.len());
        for ticker in tickers {
            match ticker.price.parse::<f64>() {
                Ok(price) => listing.push((ticker.symbol, price)),
                Err(_) => {
                    warn!(symbol = %ticker.symbol, price = %ticker.price, "BinanceFuturesClient: skipping ticker with invalid price");
                }
            }
        }

        Ok(listing)
    }
}
