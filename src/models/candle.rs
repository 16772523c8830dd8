use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar as delivered by the candle source.
///
/// Series of candles are expected in ascending `open_time` order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub quote_volume: f64,
    pub taker_buy_volume: f64,
    pub taker_buy_quote_volume: f64,
    pub trade_count: u64,
}

impl Candle {
    pub fn new(
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        open_time: DateTime<Utc>,
    ) -> Self {
        Self {
            open_time,
            close_time: open_time,
            open,
            high,
            low,
            close,
            volume,
            quote_volume: 0.0,
            taker_buy_volume: 0.0,
            taker_buy_quote_volume: 0.0,
            trade_count: 0,
        }
    }

    pub fn with_close_time(mut self, close_time: DateTime<Utc>) -> Self {
        self.close_time = close_time;
        self
    }

    pub fn with_taker_buy_volume(mut self, taker_buy_volume: f64) -> Self {
        self.taker_buy_volume = taker_buy_volume;
        self
    }

    pub fn with_quote_volume(mut self, quote_volume: f64, taker_buy_quote_volume: f64) -> Self {
        self.quote_volume = quote_volume;
        self.taker_buy_quote_volume = taker_buy_quote_volume;
        self
    }

    pub fn with_trade_count(mut self, trade_count: u64) -> Self {
        self.trade_count = trade_count;
        self
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Percent move from open to close of this bar.
    pub fn change_pct(&self) -> f64 {
        if self.open == 0.0 {
            return 0.0;
        }
        (self.close - self.open) / self.open * 100.0
    }

    /// Share of volume bought by takers, in percent. Zero-volume bars report 0.
    pub fn taker_buy_ratio(&self) -> f64 {
        if self.volume > 0.0 {
            self.taker_buy_volume / self.volume * 100.0
        } else {
            0.0
        }
    }
}

/// Close-price projection of a candle series.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}
