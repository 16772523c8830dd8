//! Shared data models spanning the engine layers.

pub mod candle;
pub mod cycle;
pub mod instrument;
pub mod signal;

pub use candle::{closes, Candle};
pub use cycle::Cycle;
pub use instrument::{FundingInterval, FundingQuote, InstrumentRecord, InstrumentState};
pub use signal::{
    CrossKind, Direction, EvaluationResult, FractalKind, PriceZone, SmcResult, StructureSignal,
};
