//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::policy::MatchPolicy;
use crate::indicators::trend::ema_series;
use crate::models::candle::Candle;
use crate::models::signal::CrossKind;

/// MACD, signal and histogram lines aligned index-by-index with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// A detected cross and the candle index it happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdCross {
    pub kind: CrossKind,
    pub index: usize,
}

/// Calculate the MACD series
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal_period) of MACD
/// Histogram = MACD - Signal
pub fn calculate_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> MacdSeries {
    let fast = ema_series(closes, fast_period);
    let slow = ema_series(closes, slow_period);

    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&macd, signal_period);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

/// Calculate MACD with default periods (12, 26, 9)
pub fn calculate_macd_default(closes: &[f64]) -> MacdSeries {
    calculate_macd(closes, 12, 26, 9)
}

/// Scan for MACD / signal crosses over the whole series.
///
/// Candles with zero volume never count as a cross point. When more than one
/// cross exists, `policy` decides which one is reported.
pub fn detect_cross(
    candles: &[Candle],
    macd: &[f64],
    signal: &[f64],
    policy: MatchPolicy,
) -> Option<MacdCross> {
    let len = candles.len().min(macd.len()).min(signal.len());
    let mut found = None;

    for i in 1..len {
        if candles[i].volume <= 0.0 {
            continue;
        }

        let (prev_macd, prev_signal) = (macd[i - 1], signal[i - 1]);
        let (curr_macd, curr_signal) = (macd[i], signal[i]);

        let kind = if prev_macd <= prev_signal && curr_macd > curr_signal {
            if curr_macd > 0.0 {
                CrossKind::GoldenAboveZero
            } else {
                CrossKind::GoldenBelowZero
            }
        } else if prev_macd >= prev_signal && curr_macd < curr_signal {
            if curr_macd > 0.0 {
                CrossKind::DeadAboveZero
            } else {
                CrossKind::DeadBelowZero
            }
        } else {
            continue;
        };

        found = Some(MacdCross { kind, index: i });
        if policy == MatchPolicy::Earliest {
            break;
        }
    }

    found
}

/// Convenience wrapper: build the MACD series from candle closes and scan it.
pub fn detect_macd_cross(
    candles: &[Candle],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
    policy: MatchPolicy,
) -> Option<MacdCross> {
    let closes = crate::models::candle::closes(candles);
    let series = calculate_macd(&closes, fast_period, slow_period, signal_period);
    detect_cross(candles, &series.macd, &series.signal, policy)
}
