//! Fractal detection on inclusion-merged bars

use crate::models::candle::Candle;
use crate::models::signal::FractalKind;

/// Minimum number of raw candles before a fractal is looked for.
pub const MIN_FRACTAL_CANDLES: usize = 5;

/// A bar reduced to its range after inclusion merging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedBar {
    pub high: f64,
    pub low: f64,
}

impl MergedBar {
    pub fn new(high: f64, low: f64) -> Self {
        Self { high, low }
    }

    fn contains_or_within(&self, other: &MergedBar) -> bool {
        (self.high >= other.high && self.low <= other.low)
            || (other.high >= self.high && other.low <= self.low)
    }
}

/// Collapse bars whose ranges contain one another.
///
/// Merging follows the direction of the last non-merged step: upward keeps the
/// higher high and higher low, downward keeps the lower high and lower low. The
/// direction starts upward.
pub fn merge_inclusions(candles: &[Candle]) -> Vec<MergedBar> {
    let Some(first) = candles.first() else {
        return Vec::new();
    };

    let mut merged = vec![MergedBar::new(first.high, first.low)];
    let mut trending_up = true;

    for candle in &candles[1..] {
        let curr = MergedBar::new(candle.high, candle.low);
        let last_idx = merged.len() - 1;
        let last = merged[last_idx];

        if last.contains_or_within(&curr) {
            merged[last_idx] = if trending_up {
                MergedBar::new(last.high.max(curr.high), last.low.max(curr.low))
            } else {
                MergedBar::new(last.high.min(curr.high), last.low.min(curr.low))
            };
        } else {
            if curr.high > last.high {
                trending_up = true;
            } else if curr.low < last.low {
                trending_up = false;
            }
            merged.push(curr);
        }
    }

    merged
}

/// Classify the last three merged bars.
pub fn classify_fractal(bars: &[MergedBar]) -> FractalKind {
    if bars.len() < 3 {
        return FractalKind::None;
    }

    let n = bars.len();
    let (k1, k2, k3) = (bars[n - 3], bars[n - 2], bars[n - 1]);

    if k2.high > k1.high && k2.high > k3.high && k2.low > k1.low && k2.low > k3.low {
        return FractalKind::Top;
    }

    if k2.high < k1.high && k2.high < k3.high && k2.low < k1.low && k2.low < k3.low {
        return FractalKind::Bottom;
    }

    FractalKind::None
}

/// Detect a top or bottom fractal at the end of the series.
pub fn detect_fractal(candles: &[Candle]) -> FractalKind {
    if candles.len() < MIN_FRACTAL_CANDLES {
        return FractalKind::None;
    }
    classify_fractal(&merge_inclusions(candles))
}
