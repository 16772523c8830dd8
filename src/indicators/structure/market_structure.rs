//! Market structure: pivot support/resistance, fair value gaps, structure
//! breaks and order blocks over the most recent candles.

use crate::indicators::policy::MatchPolicy;
use crate::models::candle::Candle;
use crate::models::signal::{Direction, PriceZone, SmcResult, StructureSignal};

pub const MIN_STRUCTURE_CANDLES: usize = 30;
pub const STRUCTURE_LOOKBACK: usize = 50;
pub const PIVOT_RADIUS: usize = 5;
pub const GAP_SCAN_DEPTH: usize = 20;
pub const ORDER_BLOCK_SCAN_DEPTH: usize = 20;

/// Pivot highs and lows found in the analysis window, in index order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pivots {
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
}

/// Analyze the market structure of a candle series.
///
/// Series shorter than [`MIN_STRUCTURE_CANDLES`] yield an empty result.
pub fn analyze_market_structure(candles: &[Candle], policy: MatchPolicy) -> SmcResult {
    if candles.len() < MIN_STRUCTURE_CANDLES {
        return SmcResult::default();
    }

    let pivots = find_pivots(candles);
    let resistance = pivots.highs.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let support = pivots.lows.iter().copied().reduce(f64::min).unwrap_or(0.0);

    let structure_signal = detect_structure_break(candles, support, resistance);
    let order_block = match structure_signal {
        StructureSignal::BullishBreak => find_order_block(candles, Direction::Bullish, policy),
        StructureSignal::BearishBreak => find_order_block(candles, Direction::Bearish, policy),
        StructureSignal::None => None,
    };

    SmcResult {
        support,
        resistance,
        structure_signal,
        fair_value_gap: find_fair_value_gap(candles, policy),
        order_block,
    }
}

/// Find pivots confirmed by [`PIVOT_RADIUS`] bars on each side.
///
/// Candidates are the bars of the last [`STRUCTURE_LOOKBACK`] candles that have
/// a full radius of neighbours on both sides; left neighbours may sit before
/// the window. Ties with a neighbour still count as a pivot.
pub fn find_pivots(candles: &[Candle]) -> Pivots {
    let n = candles.len();
    let start = n - STRUCTURE_LOOKBACK.min(n);
    let mut pivots = Pivots::default();

    for i in start.max(PIVOT_RADIUS)..n.saturating_sub(PIVOT_RADIUS) {
        let bar = &candles[i];
        let mut is_high = true;
        let mut is_low = true;

        for j in 1..=PIVOT_RADIUS {
            let (left, right) = (&candles[i - j], &candles[i + j]);
            if bar.high < left.high || bar.high < right.high {
                is_high = false;
            }
            if bar.low > left.low || bar.low > right.low {
                is_low = false;
            }
        }

        if is_high {
            pivots.highs.push(bar.high);
        }
        if is_low {
            pivots.lows.push(bar.low);
        }
    }

    pivots
}

/// Look for a three-bar fair value gap among the last [`GAP_SCAN_DEPTH`] bars.
pub fn find_fair_value_gap(candles: &[Candle], policy: MatchPolicy) -> Option<PriceZone> {
    let n = candles.len();
    if n < 3 {
        return None;
    }

    let lowest = n.saturating_sub(GAP_SCAN_DEPTH).max(2);
    let gap_at = |i: usize| -> Option<PriceZone> {
        let (first, middle, last) = (&candles[i - 2], &candles[i - 1], &candles[i]);
        if last.low > first.high && middle.is_bullish() {
            return Some(PriceZone {
                direction: Direction::Bullish,
                lower: first.high,
                upper: last.low,
            });
        }
        if last.high < first.low && middle.is_bearish() {
            return Some(PriceZone {
                direction: Direction::Bearish,
                lower: last.high,
                upper: first.low,
            });
        }
        None
    };

    match policy {
        MatchPolicy::MostRecent => (lowest..n).rev().find_map(gap_at),
        MatchPolicy::Earliest => (lowest..n).find_map(gap_at),
    }
}

/// Compare the last two closes with the established levels.
///
/// A resistance break is checked first, so only one signal can fire.
pub fn detect_structure_break(candles: &[Candle], support: f64, resistance: f64) -> StructureSignal {
    let n = candles.len();
    if n < 2 {
        return StructureSignal::None;
    }

    let current = candles[n - 1].close;
    let previous = candles[n - 2].close;

    if resistance > 0.0 && current > resistance && previous <= resistance {
        StructureSignal::BullishBreak
    } else if support > 0.0 && current < support && previous >= support {
        StructureSignal::BearishBreak
    } else {
        StructureSignal::None
    }
}

/// Find the last opposite-colored bar before a break.
///
/// A bullish block is the last bearish bar, a bearish block the last bullish
/// one, searched from the second-to-last bar back over [`ORDER_BLOCK_SCAN_DEPTH`]
/// positions.
pub fn find_order_block(
    candles: &[Candle],
    direction: Direction,
    policy: MatchPolicy,
) -> Option<PriceZone> {
    let n = candles.len();
    if n < 2 {
        return None;
    }

    let lowest = n.saturating_sub(ORDER_BLOCK_SCAN_DEPTH);
    let block_at = |i: usize| -> Option<PriceZone> {
        let bar = &candles[i];
        let opposite = match direction {
            Direction::Bullish => bar.is_bearish(),
            Direction::Bearish => bar.is_bullish(),
        };
        opposite.then_some(PriceZone {
            direction,
            lower: bar.low,
            upper: bar.high,
        })
    };

    match policy {
        MatchPolicy::MostRecent => (lowest..n - 1).rev().find_map(block_at),
        MatchPolicy::Earliest => (lowest..n - 1).find_map(block_at),
    }
}
