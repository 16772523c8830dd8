//! External collaborators: market data and notification delivery.

pub mod binance;
pub mod market_data;
pub mod notify;

pub use market_data::{MarketDataError, MarketDataProvider};
