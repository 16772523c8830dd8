//! Wire types of the Binance USDⓈ-M futures REST API.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::models::candle::Candle;
use crate::models::instrument::{FundingInterval, FundingQuote};
use crate::services::market_data::MarketDataError;

/// Kline rows are 12-element arrays with numerics encoded as strings.
pub type RawKline = Vec<Value>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumIndex {
    pub symbol: String,
    pub last_funding_rate: String,
    pub next_funding_time: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingInfo {
    pub symbol: String,
    pub funding_interval_hours: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    pub price: String,
}

fn millis(value: &Value, field: &str) -> Result<DateTime<Utc>, MarketDataError> {
    let ms = value
        .as_i64()
        .ok_or_else(|| MarketDataError::Malformed(format!("kline {} is not an integer", field)))?;
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| MarketDataError::Malformed(format!("kline {} out of range: {}", field, ms)))
}

fn decimal(value: &Value, field: &str) -> Result<f64, MarketDataError> {
    match value {
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| MarketDataError::Malformed(format!("kline {} is not numeric: {}", field, s))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| MarketDataError::Malformed(format!("kline {} is not numeric", field))),
        _ => Err(MarketDataError::Malformed(format!("kline {} has unexpected type", field))),
    }
}

pub fn parse_kline(row: &RawKline) -> Result<Candle, MarketDataError> {
    if row.len() < 11 {
        return Err(MarketDataError::Malformed(format!(
            "kline row has {} fields",
            row.len()
        )));
    }

    let open_time = millis(&row[0], "open_time")?;
    let candle = Candle::new(
        decimal(&row[1], "open")?,
        decimal(&row[2], "high")?,
        decimal(&row[3], "low")?,
        decimal(&row[4], "close")?,
        decimal(&row[5], "volume")?,
        open_time,
    )
    .with_close_time(millis(&row[6], "close_time")?)
    .with_quote_volume(decimal(&row[7], "quote_volume")?, decimal(&row[10], "taker_buy_quote_volume")?)
    .with_trade_count(row[8].as_u64().unwrap_or_default())
    .with_taker_buy_volume(decimal(&row[9], "taker_buy_volume")?);

    Ok(candle)
}

impl TryFrom<PremiumIndex> for FundingQuote {
    type Error = MarketDataError;

    fn try_from(index: PremiumIndex) -> Result<Self, Self::Error> {
        let rate = index.last_funding_rate.parse::<f64>().map_err(|_| {
            MarketDataError::Malformed(format!(
                "funding rate of {} is not numeric: {}",
                index.symbol, index.last_funding_rate
            ))
        })?;
        let next_funding_time = if index.next_funding_time > 0 {
            Utc.timestamp_millis_opt(index.next_funding_time).single()
        } else {
            None
        };

        Ok(FundingQuote {
            rate,
            next_funding_time,
        })
    }
}

impl From<FundingInfo> for FundingInterval {
    fn from(info: FundingInfo) -> Self {
        FundingInterval {
            symbol: info.symbol,
            interval_hours: info.funding_interval_hours,
        }
    }
}
