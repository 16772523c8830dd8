use crate::models::cycle::Cycle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// MACD / signal-line cross classified by the side of zero it happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrossKind {
    #[default]
    None,
    GoldenAboveZero,
    GoldenBelowZero,
    DeadAboveZero,
    DeadBelowZero,
}

impl CrossKind {
    pub fn is_some(&self) -> bool {
        *self != CrossKind::None
    }

    pub fn description(&self) -> &'static str {
        match self {
            CrossKind::None => "",
            CrossKind::GoldenAboveZero => "golden cross above zero",
            CrossKind::GoldenBelowZero => "golden cross below zero",
            CrossKind::DeadAboveZero => "dead cross above zero",
            CrossKind::DeadBelowZero => "dead cross below zero",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FractalKind {
    #[default]
    None,
    Top,
    Bottom,
}

impl FractalKind {
    pub fn is_some(&self) -> bool {
        *self != FractalKind::None
    }

    pub fn name(&self) -> &'static str {
        match self {
            FractalKind::None => "",
            FractalKind::Top => "Top fractal",
            FractalKind::Bottom => "Bottom fractal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

/// A directional price range such as a fair value gap or an order block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceZone {
    pub direction: Direction,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StructureSignal {
    #[default]
    None,
    BullishBreak,
    BearishBreak,
}

/// Market-structure levels of the recent window. A level of 0.0 means not established.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SmcResult {
    pub support: f64,
    pub resistance: f64,
    pub structure_signal: StructureSignal,
    pub fair_value_gap: Option<PriceZone>,
    pub order_block: Option<PriceZone>,
}

/// Outcome of one evaluation of one instrument in one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub symbol: String,
    pub cycle: Cycle,
    pub price: f64,
    pub change: f64,
    pub volume: f64,
    pub taker_buy_volume: f64,
    pub taker_buy_ratio: f64,
    pub rsi: f64,
    pub funding_rate: f64,
    pub next_funding_time: Option<DateTime<Utc>>,
    pub cross: CrossKind,
    pub fractal: FractalKind,
    pub volume_price_label: String,
    pub structure: SmcResult,
    pub should_notify: bool,
    /// Whether the rendered message goes to the notification path.
    pub dispatch: bool,
    pub message: Option<String>,
}
