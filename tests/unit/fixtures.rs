//! Candle series builders shared by the unit and integration suites
#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use signalwatch::models::Candle;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
}

pub fn candle(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    Candle::new(open, high, low, close, volume, base_time())
}

/// A candle with only its range set, for inclusion and fractal tests.
pub fn range(high: f64, low: f64) -> Candle {
    let mid = (high + low) / 2.0;
    candle(mid, high, low, mid, 1000.0)
}

/// Bars whose open is the previous close, padded by 0.5 on each side.
///
/// Volume is 1000 with 520 bought by takers. Bars are `step` apart starting
/// at `start`.
pub fn candles_from_closes(closes: &[f64], start: DateTime<Utc>, step: Duration) -> Vec<Candle> {
    let mut out = Vec::with_capacity(closes.len());
    let mut prev = closes.first().copied().unwrap_or_default();

    for (i, &close) in closes.iter().enumerate() {
        let open = if i == 0 { close } else { prev };
        let open_time = start + step * i as i32;
        out.push(
            Candle::new(
                open,
                open.max(close) + 0.5,
                open.min(close) - 0.5,
                close,
                1000.0,
                open_time,
            )
            .with_close_time(open_time + step)
            .with_taker_buy_volume(520.0),
        );
        prev = close;
    }

    out
}

/// 250 closes: 200 bars chopping around 100, a 30-bar rally, a 6-bar
/// pullback and a 14-bar recovery.
///
/// With MACD(12, 26, 9) the first cross is dead below zero at index 1 and the
/// last one is golden above zero at index 244.
pub fn golden_cross_closes() -> Vec<f64> {
    let mut closes = Vec::with_capacity(250);
    for i in 0..200 {
        closes.push(if i % 2 == 0 { 100.5 } else { 99.5 });
    }

    let mut c = 99.5;
    for _ in 200..230 {
        c += 1.0;
        closes.push(c);
    }
    for _ in 230..236 {
        c -= 1.5;
        closes.push(c);
    }
    for _ in 236..250 {
        c += 1.2;
        closes.push(c);
    }

    closes
}

/// [`golden_cross_closes`] as hourly candles whose last bar opens at `last_open`.
pub fn golden_cross_series(last_open: DateTime<Utc>) -> Vec<Candle> {
    let closes = golden_cross_closes();
    let step = Duration::hours(1);
    let start = last_open - step * (closes.len() as i32 - 1);
    candles_from_closes(&closes, start, step)
}

/// `len` strictly rising bars followed by one lower bar: a top fractal.
pub fn top_fractal_series(len: usize, last_open: DateTime<Utc>) -> Vec<Candle> {
    let step = Duration::hours(1);
    let start = last_open - step * len as i32;
    let mut out: Vec<Candle> = (0..len)
        .map(|i| {
            let base = 100.0 + i as f64;
            Candle::new(base, base + 1.0, base - 1.0, base + 0.5, 1000.0, start + step * i as i32)
                .with_taker_buy_volume(500.0)
        })
        .collect();

    let peak = 100.0 + (len - 1) as f64;
    out.push(
        Candle::new(peak - 1.0, peak - 1.0, peak - 3.0, peak - 2.5, 1000.0, last_open)
            .with_taker_buy_volume(400.0),
    );
    out
}
