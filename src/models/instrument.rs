use crate::models::signal::{CrossKind, EvaluationResult, FractalKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Long-lived state of one tracked instrument.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstrumentState {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub volume: f64,
    pub taker_buy_volume: f64,
    pub taker_buy_ratio: f64,
    pub rsi: f64,
    pub funding_rate: f64,
    pub cross: CrossKind,
    pub fractal: FractalKind,
    pub volume_price_label: String,
    pub next_funding_time: Option<DateTime<Utc>>,
    pub funding_interval_hours: u32,
}

impl InstrumentState {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            ..Default::default()
        }
    }

    /// Clears the cycle-scoped signal fields.
    pub fn reset_signals(&mut self) {
        self.cross = CrossKind::None;
        self.fractal = FractalKind::None;
        self.volume_price_label.clear();
    }

    /// Merges a fresh evaluation into the long-lived record.
    ///
    /// Signals are reset first so nothing from an earlier cycle survives.
    pub fn apply(&mut self, result: &EvaluationResult) {
        self.reset_signals();

        self.price = result.price;
        self.change = result.change;
        self.volume = result.volume;
        self.taker_buy_volume = result.taker_buy_volume;
        self.taker_buy_ratio = result.taker_buy_ratio;
        self.rsi = result.rsi;
        self.funding_rate = result.funding_rate;
        self.next_funding_time = result.next_funding_time;

        self.cross = result.cross;
        self.fractal = result.fractal;
        self.volume_price_label = result.volume_price_label.clone();
    }

    pub fn to_record(&self) -> InstrumentRecord {
        InstrumentRecord::from(self)
    }
}

/// Numeric projection of [`InstrumentState`] written to the registry store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub volume: f64,
    pub taker_buy_volume: f64,
    pub taker_buy_ratio: f64,
    pub rsi: f64,
    pub funding_rate: f64,
    pub funding_interval_hours: u32,
}

impl From<&InstrumentState> for InstrumentRecord {
    fn from(state: &InstrumentState) -> Self {
        Self {
            symbol: state.symbol.clone(),
            price: finite_or_zero(state.price),
            change: finite_or_zero(state.change),
            volume: finite_or_zero(state.volume),
            taker_buy_volume: finite_or_zero(state.taker_buy_volume),
            taker_buy_ratio: finite_or_zero(state.taker_buy_ratio),
            rsi: finite_or_zero(state.rsi),
            funding_rate: finite_or_zero(state.funding_rate),
            funding_interval_hours: state.funding_interval_hours,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Last funding rate and the next settlement time of a perpetual contract.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FundingQuote {
    pub rate: f64,
    pub next_funding_time: Option<DateTime<Utc>>,
}

/// Funding settlement interval of one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingInterval {
    pub symbol: String,
    pub interval_hours: u32,
}
