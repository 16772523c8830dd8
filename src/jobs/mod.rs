//! Evaluation jobs run by the cycle scheduler

pub mod context;
pub mod handlers;
pub mod types;

pub use context::JobContext;
pub use handlers::{evaluate_instrument, run_evaluation_pass};
pub use types::{InstrumentOutcome, PassSummary, SkipReason};
