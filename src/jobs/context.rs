//! Job context for dependency injection

use std::sync::Arc;
use std::time::Duration;

use crate::db::RegistryStore;
use crate::metrics::Metrics;
use crate::registry::InstrumentRegistry;
use crate::services::market_data::MarketDataProvider;
use crate::services::notify::NotifyQueue;
use crate::signals::engine::SignalEngine;

/// Everything an evaluation pass needs, shared across cycles.
///
/// Store, notification queue and metrics are optional so passes can run
/// without persistence or delivery.
pub struct JobContext {
    pub data_provider: Arc<dyn MarketDataProvider>,
    pub registry: Arc<InstrumentRegistry>,
    pub engine: Arc<SignalEngine>,
    pub store: Option<Arc<dyn RegistryStore>>,
    pub notifier: Option<Arc<NotifyQueue>>,
    pub metrics: Option<Arc<Metrics>>,
    pub stale_grace: Duration,
}

impl JobContext {
    pub fn new(
        data_provider: Arc<dyn MarketDataProvider>,
        registry: Arc<InstrumentRegistry>,
        engine: Arc<SignalEngine>,
    ) -> Self {
        Self {
            data_provider,
            registry,
            engine,
            store: None,
            notifier: None,
            metrics: None,
            stale_grace: Duration::from_secs(600),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn RegistryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<NotifyQueue>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_stale_grace(mut self, grace: Duration) -> Self {
        self.stale_grace = grace;
        self
    }
}
