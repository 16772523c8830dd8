//! Unit tests for market structure analysis

use signalwatch::indicators::structure::{
    analyze_market_structure, detect_structure_break, find_fair_value_gap, find_order_block,
    find_pivots,
};
use signalwatch::indicators::MatchPolicy;
use signalwatch::models::{Candle, Direction, PriceZone, SmcResult, StructureSignal};

use crate::fixtures::{candle, range};

/// 40 bars with rising highs, falling lows and one spike to 120 at index 30.
fn resistance_series() -> Vec<Candle> {
    (0..40)
        .map(|i| {
            let low = 90.0 - i as f64 * 0.1;
            let high = if i == 30 { 120.0 } else { 100.0 + i as f64 * 0.1 };
            candle(low + 1.0, high, low, low + 2.0, 1000.0)
        })
        .collect()
}

/// Bullish gap ending at index 5 and bearish gap ending at index 15.
fn two_gap_series() -> Vec<Candle> {
    let mut candles = Vec::new();
    for _ in 0..4 {
        candles.push(range(101.0, 99.0));
    }
    candles.push(candle(100.5, 102.0, 100.0, 101.5, 1000.0));
    candles.push(range(104.0, 102.0));
    for _ in 6..14 {
        candles.push(range(104.0, 101.0));
    }
    candles.push(candle(101.5, 102.0, 99.0, 99.5, 1000.0));
    for _ in 15..20 {
        candles.push(range(100.0, 97.0));
    }
    candles
}

#[test]
fn test_short_series_is_empty() {
    let candles = vec![range(101.0, 99.0); 29];
    assert_eq!(
        analyze_market_structure(&candles, MatchPolicy::MostRecent),
        SmcResult::default()
    );
}

#[test]
fn test_resistance_from_single_pivot() {
    let candles = resistance_series();
    let pivots = find_pivots(&candles);
    assert_eq!(pivots.highs, vec![120.0]);
    assert!(pivots.lows.is_empty());

    let smc = analyze_market_structure(&candles, MatchPolicy::MostRecent);
    assert_eq!(smc.resistance, 120.0);
    assert_eq!(smc.support, 0.0);
    assert_eq!(smc.structure_signal, StructureSignal::None);
    assert!(smc.fair_value_gap.is_none());
    assert!(smc.order_block.is_none());
}

#[test]
fn test_fair_value_gap_policy() {
    let candles = two_gap_series();

    let recent = find_fair_value_gap(&candles, MatchPolicy::MostRecent);
    assert_eq!(
        recent,
        Some(PriceZone {
            direction: Direction::Bearish,
            lower: 100.0,
            upper: 101.0,
        })
    );

    let earliest = find_fair_value_gap(&candles, MatchPolicy::Earliest);
    assert_eq!(
        earliest,
        Some(PriceZone {
            direction: Direction::Bullish,
            lower: 101.0,
            upper: 102.0,
        })
    );
}

#[test]
fn test_fair_value_gap_needs_directional_middle_bar() {
    let mut candles = two_gap_series();
    // Neutral middle bars cancel both gaps
    candles[4] = range(102.0, 100.0);
    candles[14] = range(102.0, 99.0);
    assert!(find_fair_value_gap(&candles, MatchPolicy::MostRecent).is_none());
}

#[test]
fn test_structure_break_needs_fresh_cross() {
    let breakout = [candle(100.0, 101.0, 99.0, 100.0, 1.0), candle(100.0, 106.0, 99.0, 105.0, 1.0)];
    assert_eq!(detect_structure_break(&breakout, 90.0, 102.0), StructureSignal::BullishBreak);

    let breakdown = [candle(95.0, 96.0, 94.0, 95.0, 1.0), candle(95.0, 96.0, 85.0, 86.0, 1.0)];
    assert_eq!(detect_structure_break(&breakdown, 90.0, 102.0), StructureSignal::BearishBreak);

    // Already above resistance on the previous close
    let extended = [candle(103.0, 104.0, 102.0, 103.0, 1.0), candle(103.0, 106.0, 102.0, 105.0, 1.0)];
    assert_eq!(detect_structure_break(&extended, 90.0, 102.0), StructureSignal::None);

    // Unset levels never break
    assert_eq!(detect_structure_break(&breakout, 0.0, 0.0), StructureSignal::None);
}

#[test]
fn test_order_block_is_last_opposite_bar() {
    let candles = [
        candle(100.0, 101.0, 98.0, 99.0, 1.0),
        candle(99.0, 100.0, 97.0, 98.0, 1.0),
        candle(98.0, 101.0, 97.5, 100.5, 1.0),
        candle(100.5, 106.0, 100.0, 105.0, 1.0),
    ];

    let recent = find_order_block(&candles, Direction::Bullish, MatchPolicy::MostRecent);
    assert_eq!(
        recent,
        Some(PriceZone {
            direction: Direction::Bullish,
            lower: 97.0,
            upper: 100.0,
        })
    );

    let earliest = find_order_block(&candles, Direction::Bullish, MatchPolicy::Earliest);
    assert_eq!(
        earliest,
        Some(PriceZone {
            direction: Direction::Bullish,
            lower: 98.0,
            upper: 101.0,
        })
    );

    let bearish = find_order_block(&candles, Direction::Bearish, MatchPolicy::MostRecent);
    assert_eq!(
        bearish,
        Some(PriceZone {
            direction: Direction::Bearish,
            lower: 97.5,
            upper: 101.0,
        })
    );
}

#[test]
fn test_order_block_ignores_breaking_bar() {
    let candles = [
        candle(100.0, 101.0, 99.0, 100.0, 1.0),
        candle(105.0, 106.0, 99.0, 100.0, 1.0),
    ];
    assert!(find_order_block(&candles, Direction::Bullish, MatchPolicy::MostRecent).is_none());
}
