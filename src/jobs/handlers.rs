//! Job handlers for the per-cycle evaluation pass

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::jobs::context::JobContext;
use crate::jobs::types::{InstrumentOutcome, PassSummary, SkipReason};
use crate::models::cycle::Cycle;
use crate::models::instrument::FundingQuote;
use crate::registry::InstrumentHandle;
use crate::services::market_data::MarketDataError;
use crate::services::notify::{NotificationJob, PushOutcome};

/// Evaluate every tracked instrument once for `cycle`.
///
/// Instruments are taken from a registry snapshot and handled one after the
/// other; a failure only affects the instrument it happened on.
pub async fn run_evaluation_pass(ctx: &JobContext, cycle: Cycle, now: DateTime<Utc>) -> PassSummary {
    let started = Instant::now();
    let handles = ctx.registry.snapshot().await;

    info!(
        cycle = %cycle,
        instruments = handles.len(),
        "EvaluationPass: starting {} pass over {} instruments",
        cycle,
        handles.len()
    );

    let mut summary = PassSummary::default();
    for handle in &handles {
        let outcome = evaluate_instrument(ctx, handle, cycle, now).await;
        summary.record(outcome);
    }

    let elapsed = started.elapsed();
    if let Some(metrics) = &ctx.metrics {
        metrics
            .evaluation_pass_duration_seconds
            .observe(elapsed.as_secs_f64());
        metrics.tracked_instruments.set(handles.len() as f64);
    }

    info!(
        cycle = %cycle,
        evaluated = summary.evaluated,
        skipped = summary.skipped,
        failed = summary.failed,
        alerts = summary.alerts,
        dispatched = summary.dispatched,
        duration_ms = elapsed.as_millis() as u64,
        "EvaluationPass: {} pass finished in {}ms",
        cycle,
        elapsed.as_millis()
    );

    summary
}

/// Fetch, evaluate and merge one instrument.
pub async fn evaluate_instrument(
    ctx: &JobContext,
    handle: &InstrumentHandle,
    cycle: Cycle,
    now: DateTime<Utc>,
) -> InstrumentOutcome {
    // Signals from the previous cycle must not survive a failed or skipped pass.
    let symbol = {
        let mut state = handle.lock().await;
        state.reset_signals();
        state.symbol.clone()
    };
    let label = cycle.as_str();
    let min_candles = ctx.engine.settings().klines;

    let candles = match ctx
        .data_provider
        .get_candles(&symbol, cycle, min_candles)
        .await
    {
        Ok(candles) => candles,
        Err(MarketDataError::SymbolNotSupported(_)) => {
            warn!(symbol = %symbol, cycle = %cycle, "EvaluateInstrument: {} has no futures contract", symbol);
            count_failure(ctx, label);
            return InstrumentOutcome::Failed;
        }
        Err(e) => {
            error!(symbol = %symbol, cycle = %cycle, error = %e, "EvaluateInstrument: failed to fetch candles for {}", symbol);
            count_failure(ctx, label);
            return InstrumentOutcome::Failed;
        }
    };

    if candles.len() < min_candles {
        warn!(
            symbol = %symbol,
            cycle = %cycle,
            count = candles.len(),
            required = min_candles,
            "EvaluateInstrument: not enough candles ({} < {}) for {}",
            candles.len(),
            min_candles,
            symbol
        );
        count_skip(ctx, label);
        return InstrumentOutcome::Skipped(SkipReason::InsufficientData);
    }

    if let Some(last) = candles.last() {
        if is_stale(last.open_time, cycle, ctx, now) {
            warn!(
                symbol = %symbol,
                cycle = %cycle,
                last_open = %last.open_time.format("%Y-%m-%d %H:%M:%S"),
                "EvaluateInstrument: last candle of {} is stale",
                symbol
            );
            count_skip(ctx, label);
            return InstrumentOutcome::Skipped(SkipReason::StaleSeries);
        }
    }

    let funding = match ctx.data_provider.get_funding_quote(&symbol).await {
        Ok(quote) => quote,
        Err(e) => {
            warn!(symbol = %symbol, error = %e, "EvaluateInstrument: funding quote unavailable for {}", symbol);
            FundingQuote::default()
        }
    };

    let Some(result) = ctx.engine.evaluate(&symbol, cycle, &candles, funding, now) else {
        count_skip(ctx, label);
        return InstrumentOutcome::Skipped(SkipReason::InsufficientData);
    };

    let record = {
        let mut state = handle.lock().await;
        state.apply(&result);
        state.to_record()
    };

    if let Some(metrics) = &ctx.metrics {
        metrics.evaluations_total.with_label_values(&[label]).inc();
    }

    if let Some(store) = &ctx.store {
        if let Err(e) = store.upsert(&record).await {
            error!(symbol = %symbol, error = %e, "EvaluateInstrument: failed to persist {}", symbol);
        }
    }

    let Some(message) = result.message else {
        debug!(symbol = %symbol, cycle = %cycle, rsi = result.rsi, "EvaluateInstrument: nothing notable for {}", symbol);
        return InstrumentOutcome::Evaluated {
            alerted: false,
            dispatched: false,
        };
    };

    if let Some(metrics) = &ctx.metrics {
        metrics.alerts_rendered_total.with_label_values(&[label]).inc();
    }

    info!(
        symbol = %symbol,
        cycle = %cycle,
        cross = ?result.cross,
        fractal = ?result.fractal,
        rsi = result.rsi,
        volume_price = %result.volume_price_label,
        dispatch = result.dispatch,
        "EvaluateInstrument: alert for {} {}\n{}",
        symbol,
        cycle,
        message
    );

    let dispatched = result.dispatch
        && match &ctx.notifier {
            Some(queue) => {
                queue.push(NotificationJob::new(symbol.clone(), cycle, message)) == PushOutcome::Queued
            }
            None => false,
        };

    InstrumentOutcome::Evaluated {
        alerted: true,
        dispatched,
    }
}

fn is_stale(last_open: DateTime<Utc>, cycle: Cycle, ctx: &JobContext, now: DateTime<Utc>) -> bool {
    let grace = chrono::Duration::from_std(ctx.stale_grace).unwrap_or(chrono::Duration::zero());
    now > cycle.next_open(last_open) + grace
}

fn count_failure(ctx: &JobContext, cycle: &str) {
    if let Some(metrics) = &ctx.metrics {
        metrics
            .evaluation_failures_total
            .with_label_values(&[cycle])
            .inc();
    }
}

fn count_skip(ctx: &JobContext, cycle: &str) {
    if let Some(metrics) = &ctx.metrics {
        metrics
            .evaluations_skipped_total
            .with_label_values(&[cycle])
            .inc();
    }
}
