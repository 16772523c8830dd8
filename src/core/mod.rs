//! Core application primitives (schedulers, HTTP, wiring)

pub mod funding;
pub mod http;
pub mod runtime;
pub mod scheduler;

pub use funding::FundingRefresher;
pub use http::{create_router, start_server, AppState};
pub use runtime::SignalRuntime;
pub use scheduler::CycleScheduler;
