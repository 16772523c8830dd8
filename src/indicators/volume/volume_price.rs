//! Volume-price relationship classifier

use crate::models::candle::Candle;

/// Number of candles averaged for the volume baseline (current one included).
pub const VOLUME_WINDOW: usize = 20;
/// Current volume above `SPIKE_FACTOR * average` is a spike.
pub const SPIKE_FACTOR: f64 = 1.5;
/// Current volume below `SHRINK_FACTOR * previous` is a shrink.
pub const SHRINK_FACTOR: f64 = 0.8;
/// Taker-buy ratio (percent) above which a strong up move gets the marker.
pub const EMPHASIS_TAKER_RATIO: f64 = 55.0;
pub const EMPHASIS_MARKER: &str = "🔥";

/// Keywords marking a label as worth an alert.
pub const ALERT_KEYWORDS: [&str; 5] = ["divergence", "caution", "strong", "panic", "shakeout"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumePriceKind {
    SurgeUpStrong,
    ThinUpDivergence,
    UpHealthy,
    SurgeDownPanic,
    ThinDownShakeout,
    DownHealthy,
    SurgeStallCaution,
}

impl VolumePriceKind {
    pub fn label(&self) -> &'static str {
        match self {
            VolumePriceKind::SurgeUpStrong => "volume-surge-up-strong",
            VolumePriceKind::ThinUpDivergence => "volume-thin-up-divergence",
            VolumePriceKind::UpHealthy => "volume-up-healthy",
            VolumePriceKind::SurgeDownPanic => "volume-surge-down-panic",
            VolumePriceKind::ThinDownShakeout => "volume-thin-down-shakeout",
            VolumePriceKind::DownHealthy => "volume-down-healthy",
            VolumePriceKind::SurgeStallCaution => "volume-surge-stall-caution",
        }
    }
}

/// Classify the last candle against its volume baseline.
///
/// Returns `None` for short series and for a flat close without a spike.
pub fn classify_volume_price(candles: &[Candle]) -> Option<VolumePriceKind> {
    let n = candles.len();
    if n < VOLUME_WINDOW {
        return None;
    }

    let current = &candles[n - 1];
    let previous = &candles[n - 2];

    let average = candles[n - VOLUME_WINDOW..]
        .iter()
        .map(|c| c.volume)
        .sum::<f64>()
        / VOLUME_WINDOW as f64;

    let spike = current.volume > average * SPIKE_FACTOR;
    let shrink = current.volume < previous.volume * SHRINK_FACTOR;

    let kind = if current.close > previous.close {
        if spike {
            VolumePriceKind::SurgeUpStrong
        } else if shrink {
            VolumePriceKind::ThinUpDivergence
        } else {
            VolumePriceKind::UpHealthy
        }
    } else if current.close < previous.close {
        if spike {
            VolumePriceKind::SurgeDownPanic
        } else if shrink {
            VolumePriceKind::ThinDownShakeout
        } else {
            VolumePriceKind::DownHealthy
        }
    } else if spike {
        VolumePriceKind::SurgeStallCaution
    } else {
        return None;
    };

    Some(kind)
}

/// Text label for the last candle, empty when there is nothing to report.
///
/// `taker_buy_ratio` is a percentage; a strong up move above
/// [`EMPHASIS_TAKER_RATIO`] carries the [`EMPHASIS_MARKER`].
pub fn volume_price_label(candles: &[Candle], taker_buy_ratio: f64) -> String {
    match classify_volume_price(candles) {
        Some(VolumePriceKind::SurgeUpStrong) if taker_buy_ratio > EMPHASIS_TAKER_RATIO => {
            format!("{} {}", VolumePriceKind::SurgeUpStrong.label(), EMPHASIS_MARKER)
        }
        Some(kind) => kind.label().to_string(),
        None => String::new(),
    }
}

pub fn is_alert_worthy(label: &str) -> bool {
    label.contains(EMPHASIS_MARKER) || ALERT_KEYWORDS.iter().any(|k| label.contains(k))
}
