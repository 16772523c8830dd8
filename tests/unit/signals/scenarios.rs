//! End-to-end evaluation scenarios over realistic candle series

use chrono::{Duration, TimeZone, Utc};
use signalwatch::indicators::MatchPolicy;
use signalwatch::models::{CrossKind, Cycle, FractalKind, FundingQuote, InstrumentState, StructureSignal};
use signalwatch::signals::{EngineSettings, SignalEngine};

use crate::fixtures::golden_cross_series;

#[test]
fn test_golden_cross_rally_is_logged_not_dispatched() {
    let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 5).unwrap();
    let candles = golden_cross_series(now - Duration::hours(1));
    assert_eq!(candles.len(), 250);

    let engine = SignalEngine::default();
    let result = engine
        .evaluate("BTCUSDT", Cycle::OneHour, &candles, FundingQuote::default(), now)
        .unwrap();

    assert_eq!(result.cross, CrossKind::GoldenAboveZero);
    assert!(result.rsi > 70.0);
    assert_eq!(result.fractal, FractalKind::None);
    assert_eq!(result.volume_price_label, "volume-up-healthy");
    assert!((result.taker_buy_ratio - 52.0).abs() < 1e-9);

    assert_eq!(result.structure.resistance, 130.0);
    assert_eq!(result.structure.support, 99.0);
    assert_eq!(result.structure.structure_signal, StructureSignal::None);
    assert!(result.structure.order_block.is_none());

    assert!(result.should_notify);
    assert!(!result.dispatch);

    let message = result.message.unwrap();
    assert!(message.starts_with("     ---- [ BTCUSDT 1h ] ----\n"));
    assert!(message.contains("MACD: golden cross above zero\n"));
    assert!(message.contains("(overbought)\n"));
    assert!(message.contains("Volume: 1000.00 (52.00%)\n"));
    assert!(message.contains("Volume-price: volume-up-healthy\n"));
    assert!(message.contains("Funding: 0.0000%\n"));
    assert!(message.ends_with("Time: 2026-10-18 12:00:05"));
}

#[test]
fn test_earliest_policy_reports_first_cross() {
    let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 5).unwrap();
    let candles = golden_cross_series(now - Duration::hours(1));

    let engine = SignalEngine::new(EngineSettings {
        match_policy: MatchPolicy::Earliest,
        ..EngineSettings::default()
    });
    let result = engine
        .evaluate("BTCUSDT", Cycle::OneHour, &candles, FundingQuote::default(), now)
        .unwrap();

    assert_eq!(result.cross, CrossKind::DeadBelowZero);
    let message = result.message.unwrap();
    assert!(message.contains("MACD: dead cross below zero\n"));
}

#[test]
fn test_evaluate_and_apply_is_idempotent() {
    let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 5).unwrap();
    let candles = golden_cross_series(now - Duration::hours(1));
    let engine = SignalEngine::default();
    let funding = FundingQuote {
        rate: -0.0002,
        next_funding_time: Some(now + Duration::hours(4)),
    };

    let first = engine
        .evaluate("BTCUSDT", Cycle::OneHour, &candles, funding, now)
        .unwrap();
    let second = engine
        .evaluate("BTCUSDT", Cycle::OneHour, &candles, funding, now)
        .unwrap();
    assert_eq!(first, second);

    let mut once = InstrumentState::new("BTCUSDT", 0.0);
    once.apply(&first);
    let mut twice = once.clone();
    twice.apply(&second);
    assert_eq!(once, twice);
    assert_eq!(once.cross, CrossKind::GoldenAboveZero);
    assert_eq!(once.funding_rate, -0.0002);
}
