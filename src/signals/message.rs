//! Alert message rendering

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::models::signal::EvaluationResult;
use crate::signals::engine::RsiSettings;

/// Volumes at or above this are shown in units of 10⁴.
pub const VOLUME_SCALE_THRESHOLD: f64 = 10_000.0;

pub fn format_volume(volume: f64) -> String {
    if volume >= VOLUME_SCALE_THRESHOLD {
        format!("{:.2}×10⁴", volume / VOLUME_SCALE_THRESHOLD)
    } else {
        format!("{:.2}", volume)
    }
}

/// Render the alert text for an evaluation.
///
/// The funding rate is a fraction and is shown as a percentage.
pub fn render_alert(result: &EvaluationResult, rsi: &RsiSettings, now: DateTime<Utc>) -> String {
    let mut msg = String::new();

    if result.fractal.is_some() {
        let _ = writeln!(
            msg,
            "     ---- [ {} {} {} ] ----",
            result.symbol,
            result.cycle,
            result.fractal.name()
        );
    } else {
        let _ = writeln!(msg, "     ---- [ {} {} ] ----", result.symbol, result.cycle);
    }

    let _ = writeln!(msg, "Price: {:.4} ({:.2}%)", result.price, result.change);

    if result.cross.is_some() {
        let _ = writeln!(msg, "MACD: {}", result.cross.description());
    }
    if result.fractal.is_some() {
        let _ = writeln!(msg, "Fractal: {}", result.fractal.name());
    }

    let rsi_status = if rsi.is_overbought(result.rsi) {
        " (overbought)"
    } else if rsi.is_oversold(result.rsi) {
        " (oversold)"
    } else {
        ""
    };
    let _ = writeln!(msg, "RSI: {:.2}{}", result.rsi, rsi_status);

    let _ = writeln!(
        msg,
        "Volume: {} ({:.2}%)",
        format_volume(result.volume),
        result.taker_buy_ratio
    );

    if !result.volume_price_label.is_empty() {
        let _ = writeln!(msg, "Volume-price: {}", result.volume_price_label);
    }

    let _ = write!(msg, "Funding: {:.4}%", result.funding_rate * 100.0);
    if let Some(next) = result.next_funding_time {
        let hours_left = (next - now).num_seconds() as f64 / 3600.0;
        if hours_left > 0.0 {
            let _ = write!(msg, " ({:.1}h to settlement)", hours_left);
        }
    }
    msg.push('\n');

    let _ = write!(msg, "Time: {}", now.format("%Y-%m-%d %H:%M:%S"));

    msg
}
