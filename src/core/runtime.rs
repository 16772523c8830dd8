//! Wiring of cycle schedulers, the funding refresher and the notification worker

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::{AppConfig, CycleConfig, Mode};
use crate::core::funding::FundingRefresher;
use crate::core::scheduler::CycleScheduler;
use crate::jobs::context::JobContext;
use crate::services::notify::{NotificationSink, NotifyQueue};

/// Long-running tasks of the signal engine.
pub struct SignalRuntime {
    mode: Mode,
    cycles: Vec<CycleConfig>,
    job_context: Arc<JobContext>,
    refresher: Option<FundingRefresher>,
    sinks: Vec<Arc<dyn NotificationSink>>,
}

impl SignalRuntime {
    pub fn new(config: &AppConfig, job_context: Arc<JobContext>) -> Self {
        Self {
            mode: config.mode,
            cycles: config.cycles.clone(),
            job_context,
            refresher: None,
            sinks: Vec::new(),
        }
    }

    pub fn with_refresher(mut self, refresher: FundingRefresher) -> Self {
        self.refresher = Some(refresher);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Start every task and return their handles.
    ///
    /// The notification worker is only started when the context carries a
    /// queue and at least one sink is registered.
    pub async fn start(
        self,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Vec<JoinHandle<()>>, Box<dyn std::error::Error + Send + Sync>> {
        let mut handles = Vec::new();

        if let Some(queue) = self.job_context.notifier.clone() {
            if self.sinks.is_empty() {
                warn!("SignalRuntime: notification queue configured without sinks, alerts will be dropped");
            } else if let Some(handle) = start_worker(&queue, self.sinks, shutdown.clone()).await {
                handles.push(handle);
            }
        }

        if let Some(refresher) = self.refresher {
            handles.push(refresher.spawn(shutdown.clone()));
        }

        if self.cycles.is_empty() {
            warn!("SignalRuntime: no cycles configured");
        }

        for cycle in &self.cycles {
            let scheduler = CycleScheduler::new(self.job_context.clone(), cycle, self.mode)?;
            handles.push(scheduler.spawn(shutdown.clone()));
        }

        info!(
            cycles = self.cycles.len(),
            tasks = handles.len(),
            "SignalRuntime: started {} tasks",
            handles.len()
        );

        Ok(handles)
    }
}

async fn start_worker(
    queue: &Arc<NotifyQueue>,
    sinks: Vec<Arc<dyn NotificationSink>>,
    shutdown: watch::Receiver<bool>,
) -> Option<JoinHandle<()>> {
    queue.start(sinks, shutdown).await
}
