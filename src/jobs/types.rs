//! Outcomes of evaluation jobs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Fewer candles than the configured minimum.
    InsufficientData,
    /// The last candle is older than one cycle plus the grace period.
    StaleSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentOutcome {
    Evaluated { alerted: bool, dispatched: bool },
    Skipped(SkipReason),
    Failed,
}

/// Counters of one evaluation pass over the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSummary {
    pub evaluated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub alerts: usize,
    pub dispatched: usize,
}

impl PassSummary {
    pub fn record(&mut self, outcome: InstrumentOutcome) {
        match outcome {
            InstrumentOutcome::Evaluated { alerted, dispatched } => {
                self.evaluated += 1;
                self.alerts += usize::from(alerted);
                self.dispatched += usize::from(dispatched);
            }
            InstrumentOutcome::Skipped(_) => self.skipped += 1,
            InstrumentOutcome::Failed => self.failed += 1,
        }
    }
}
