//! Technical-signal alerting for perpetual futures.
//!
//! Candle series are pulled per instrument and per cycle, run through a set of
//! independent analyzers (MACD cross, RSI, fractal, market structure and
//! volume-price), fused into an alert decision and handed to the notifier.

pub mod config;
pub mod core;
pub mod db;
pub mod indicators;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod services;
pub mod signals;
