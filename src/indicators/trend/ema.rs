//! EMA (Exponential Moving Average) indicator

/// Calculate the EMA series of `values`.
///
/// Seeded with the first value, then `ema[i] = v[i] * k + ema[i-1] * (1 - k)`
/// with `k = 2 / (period + 1)`. The output has the same length as the input.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());

    for (i, &value) in values.iter().enumerate() {
        if i == 0 {
            out.push(value);
        } else {
            let prev = out[i - 1];
            out.push(value * k + prev * (1.0 - k));
        }
    }

    out
}

/// Latest EMA value, if any input was given.
pub fn latest_ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}
