//! Hourly refresh of funding intervals and the tracked instrument list

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, DurationRound, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::core::scheduler::sleep_or_shutdown;
use crate::db::RegistryStore;
use crate::metrics::Metrics;
use crate::registry::{InstrumentRegistry, SyncSummary};
use crate::services::market_data::{MarketDataError, MarketDataProvider};

pub const RETRY_DELAY: Duration = Duration::from_secs(60);

/// Time left until the next top of the hour after `now`.
pub fn until_next_hour(now: DateTime<Utc>) -> Duration {
    let hour = chrono::Duration::hours(1);
    let next = now.duration_trunc(hour).map(|t| t + hour).unwrap_or(now + hour);
    (next - now).to_std().unwrap_or(Duration::from_secs(3600))
}

pub struct FundingRefresher {
    provider: Arc<dyn MarketDataProvider>,
    registry: Arc<InstrumentRegistry>,
    store: Option<Arc<dyn RegistryStore>>,
    metrics: Option<Arc<Metrics>>,
    retry_delay: Duration,
}

impl FundingRefresher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, registry: Arc<InstrumentRegistry>) -> Self {
        Self {
            provider,
            registry,
            store: None,
            metrics: None,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn RegistryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sync the registry with the current symbol listing.
    pub async fn sync_symbols(&self) -> Result<SyncSummary, MarketDataError> {
        let listing = self.provider.list_symbols().await?;
        let summary = self.registry.sync_symbols(&listing).await;
        if let Some(metrics) = &self.metrics {
            metrics.tracked_instruments.set(self.registry.len().await as f64);
        }
        Ok(summary)
    }

    /// Fetch funding intervals, apply them and persist the changes.
    ///
    /// Returns the number of instruments updated.
    pub async fn refresh_intervals(&self) -> Result<usize, MarketDataError> {
        let intervals = self.provider.get_funding_intervals().await?;
        let applied = self.registry.apply_funding_intervals(&intervals).await;

        if let Some(store) = &self.store {
            for interval in &applied {
                if let Err(e) = store
                    .update_funding_interval(&interval.symbol, interval.interval_hours)
                    .await
                {
                    warn!(symbol = %interval.symbol, error = %e, "FundingRefresher: failed to persist interval for {}", interval.symbol);
                }
            }
        }

        info!(updated = applied.len(), "FundingRefresher: funding intervals updated for {} instruments", applied.len());
        Ok(applied.len())
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.refresh_intervals().await {
                error!(error = %e, "FundingRefresher: failed to fetch funding intervals");
                if sleep_or_shutdown(self.retry_delay, &mut shutdown).await {
                    break;
                }
                continue;
            }

            if sleep_or_shutdown(until_next_hour(Utc::now()), &mut shutdown).await {
                break;
            }

            if let Err(e) = self.sync_symbols().await {
                error!(error = %e, "FundingRefresher: failed to refresh symbol list");
            }
        }

        info!("FundingRefresher: stopped");
    }
}
