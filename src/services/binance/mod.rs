//! Binance USDⓈ-M futures market data adapter

pub mod client;
pub mod types;

pub use client::{BinanceFuturesClient, DEFAULT_BASE_URL};
