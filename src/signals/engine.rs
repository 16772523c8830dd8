//! Signal fusion: runs every analyzer over a candle series and decides
//! whether the outcome is worth an alert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::indicators::momentum::{calculate_macd, calculate_rsi, detect_cross};
use crate::indicators::policy::MatchPolicy;
use crate::indicators::structure::{analyze_market_structure, detect_fractal};
use crate::indicators::volume::{is_alert_worthy, volume_price_label};
use crate::models::candle::{closes, Candle};
use crate::models::cycle::Cycle;
use crate::models::instrument::FundingQuote;
use crate::models::signal::{CrossKind, EvaluationResult};
use crate::signals::message::render_alert;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdSettings {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdSettings {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiSettings {
    pub period: usize,
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for RsiSettings {
    fn default() -> Self {
        Self {
            period: 14,
            overbought: 70.0,
            oversold: 30.0,
        }
    }
}

impl RsiSettings {
    pub fn is_overbought(&self, rsi: f64) -> bool {
        rsi >= self.overbought
    }

    pub fn is_oversold(&self, rsi: f64) -> bool {
        rsi <= self.oversold
    }
}

/// Analyzer parameters shared by every evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub macd: MacdSettings,
    pub rsi: RsiSettings,
    /// Candles requested per evaluation, also the minimum accepted.
    pub klines: usize,
    pub match_policy: MatchPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            macd: MacdSettings::default(),
            rsi: RsiSettings::default(),
            klines: 250,
            match_policy: MatchPolicy::MostRecent,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    settings: EngineSettings,
}

impl SignalEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Evaluate one candle series for one instrument and cycle.
    ///
    /// `now` stamps the message and drives the funding countdown, so the same
    /// inputs always give the same result. Returns `None` for an empty series.
    pub fn evaluate(
        &self,
        symbol: &str,
        cycle: Cycle,
        candles: &[Candle],
        funding: FundingQuote,
        now: DateTime<Utc>,
    ) -> Option<EvaluationResult> {
        let latest = candles.last()?;
        let close_prices = closes(candles);
        let policy = self.settings.match_policy;

        let macd = &self.settings.macd;
        let series = calculate_macd(
            &close_prices,
            macd.fast_period,
            macd.slow_period,
            macd.signal_period,
        );
        let cross = detect_cross(candles, &series.macd, &series.signal, policy)
            .map(|c| c.kind)
            .unwrap_or(CrossKind::None);

        let rsi = calculate_rsi(&close_prices, self.settings.rsi.period);
        let fractal = detect_fractal(candles);
        let structure = analyze_market_structure(candles, policy);

        let taker_buy_ratio = latest.taker_buy_ratio();
        let volume_price_label = volume_price_label(candles, taker_buy_ratio);

        let should_notify = cross.is_some()
            || fractal.is_some()
            || self.settings.rsi.is_overbought(rsi)
            || self.settings.rsi.is_oversold(rsi)
            || is_alert_worthy(&volume_price_label);

        let mut result = EvaluationResult {
            symbol: symbol.to_string(),
            cycle,
            price: latest.close,
            change: latest.change_pct(),
            volume: latest.volume,
            taker_buy_volume: latest.taker_buy_volume,
            taker_buy_ratio,
            rsi,
            funding_rate: funding.rate,
            next_funding_time: funding.next_funding_time,
            cross,
            fractal,
            volume_price_label,
            structure,
            should_notify,
            dispatch: false,
            message: None,
        };

        if should_notify {
            result.message = Some(render_alert(&result, &self.settings.rsi, now));
        }
        // Only fractals go out; other triggers are logged by the caller.
        result.dispatch = result.fractal.is_some() && result.message.is_some();

        Some(result)
    }
}
