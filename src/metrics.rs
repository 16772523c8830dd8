//! Prometheus metrics for the evaluation engine and notification path.

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,

    pub evaluations_total: IntCounterVec,
    pub evaluation_failures_total: IntCounterVec,
    pub evaluations_skipped_total: IntCounterVec,
    pub alerts_rendered_total: IntCounterVec,
    pub evaluation_pass_duration_seconds: Histogram,
    pub tracked_instruments: Gauge,

    pub notifications_dispatched_total: IntCounter,
    pub notifications_dropped_total: IntCounter,
    pub notifications_failed_total: IntCounter,

    pub database_connected: Gauge,
    pub http_requests_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("signalwatch".to_string()), None)?;

        let evaluations_total = IntCounterVec::new(
            Opts::new("evaluations_total", "Instrument evaluations completed"),
            &["cycle"],
        )?;
        let evaluation_failures_total = IntCounterVec::new(
            Opts::new(
                "evaluation_failures_total",
                "Instrument evaluations aborted by a data source error",
            ),
            &["cycle"],
        )?;
        let evaluations_skipped_total = IntCounterVec::new(
            Opts::new(
                "evaluations_skipped_total",
                "Instrument evaluations skipped for short or stale series",
            ),
            &["cycle"],
        )?;
        let alerts_rendered_total = IntCounterVec::new(
            Opts::new("alerts_rendered_total", "Alert messages rendered"),
            &["cycle"],
        )?;
        let evaluation_pass_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "evaluation_pass_duration_seconds",
                "Wall time of one evaluation pass over all instruments",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        )?;
        let tracked_instruments = Gauge::new("tracked_instruments", "Instruments in the registry")?;

        let notifications_dispatched_total = IntCounter::new(
            "notifications_dispatched_total",
            "Notification jobs delivered to at least one sink",
        )?;
        let notifications_dropped_total = IntCounter::new(
            "notifications_dropped_total",
            "Notification jobs dropped before delivery",
        )?;
        let notifications_failed_total = IntCounter::new(
            "notifications_failed_total",
            "Failed notification deliveries",
        )?;

        let database_connected = Gauge::new("database_connected", "1 when the registry store is connected")?;
        let http_requests_total = IntCounter::new("http_requests_total", "HTTP requests served")?;

        registry.register(Box::new(evaluations_total.clone()))?;
        registry.register(Box::new(evaluation_failures_total.clone()))?;
        registry.register(Box::new(evaluations_skipped_total.clone()))?;
        registry.register(Box::new(alerts_rendered_total.clone()))?;
        registry.register(Box::new(evaluation_pass_duration_seconds.clone()))?;
        registry.register(Box::new(tracked_instruments.clone()))?;
        registry.register(Box::new(notifications_dispatched_total.clone()))?;
        registry.register(Box::new(notifications_dropped_total.clone()))?;
        registry.register(Box::new(notifications_failed_total.clone()))?;
        registry.register(Box::new(database_connected.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;

        Ok(Self {
            registry,
            evaluations_total,
            evaluation_failures_total,
            evaluations_skipped_total,
            alerts_rendered_total,
            evaluation_pass_duration_seconds,
            tracked_instruments,
            notifications_dispatched_total,
            notifications_dropped_total,
            notifications_failed_total,
            database_connected,
            http_requests_total,
        })
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
