//! RSI (Relative Strength Index) indicator, Wilder smoothing

/// Value reported when RSI cannot be computed meaningfully.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Calculate RSI over `closes`
///
/// RSI = 100 - (100 / (1 + RS))
/// RS = Average Gain / Average Loss
///
/// Averages are seeded from the first `period` diffs and smoothed with
/// `avg = (avg * (period - 1) + x) / period` afterwards. Series not longer
/// than `period` report 50.
pub fn calculate_rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() <= period {
        return NEUTRAL_RSI;
    }

    let p = period as f64;
    let mut gains = 0.0;
    let mut losses = 0.0;

    for i in 1..=period {
        let diff = closes[i] - closes[i - 1];
        if diff >= 0.0 {
            gains += diff;
        } else {
            losses -= diff;
        }
    }

    let mut avg_gain = gains / p;
    let mut avg_loss = losses / p;

    for i in (period + 1)..closes.len() {
        let diff = closes[i] - closes[i - 1];
        let (gain, loss) = if diff >= 0.0 { (diff, 0.0) } else { (0.0, -diff) };
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
    }

    // Flat market
    if avg_gain == 0.0 && avg_loss == 0.0 {
        return NEUTRAL_RSI;
    }

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - (100.0 / (1.0 + rs));

    if rsi.is_finite() {
        rsi
    } else {
        NEUTRAL_RSI
    }
}

/// Calculate RSI with default period (14)
pub fn calculate_rsi_default(closes: &[f64]) -> f64 {
    calculate_rsi(closes, 14)
}
