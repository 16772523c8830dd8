//! Bounded notification queue with a single delivery worker.
//!
//! Producers never wait: a job pushed while the queue is full, closed or not
//! yet drained by a worker is dropped and counted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{NotificationJob, NotificationSink};
use crate::metrics::Metrics;

pub const DEFAULT_QUEUE_CAPACITY: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    DroppedFull,
    DroppedNotStarted,
    DroppedClosed,
}

pub struct NotifyQueue {
    sender: mpsc::Sender<NotificationJob>,
    receiver: Mutex<Option<mpsc::Receiver<NotificationJob>>>,
    started: AtomicBool,
    metrics: Option<Arc<Metrics>>,
}

impl NotifyQueue {
    pub fn new(capacity: usize, metrics: Option<Arc<Metrics>>) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            started: AtomicBool::new(false),
            metrics,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn push(&self, job: NotificationJob) -> PushOutcome {
        if !self.is_started() {
            warn!(symbol = %job.symbol, cycle = %job.cycle, "NotifyQueue: worker not started, job dropped");
            self.count_drop();
            return PushOutcome::DroppedNotStarted;
        }

        match self.sender.try_send(job) {
            Ok(()) => PushOutcome::Queued,
            Err(TrySendError::Full(job)) => {
                warn!(symbol = %job.symbol, cycle = %job.cycle, "NotifyQueue: queue full, job dropped");
                self.count_drop();
                PushOutcome::DroppedFull
            }
            Err(TrySendError::Closed(job)) => {
                warn!(symbol = %job.symbol, cycle = %job.cycle, "NotifyQueue: queue closed, job dropped");
                self.count_drop();
                PushOutcome::DroppedClosed
            }
        }
    }

    fn count_drop(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.notifications_dropped_total.inc();
        }
    }

    /// Spawn the delivery worker. Returns `None` when a worker already runs.
    ///
    /// Every job is handed to each sink in order; failures are logged and
    /// counted, never retried. The worker exits when `shutdown` flips to true.
    pub async fn start(
        self: &Arc<Self>,
        sinks: Vec<Arc<dyn NotificationSink>>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Option<JoinHandle<()>> {
        let mut receiver = self.receiver.lock().await.take()?;
        let metrics = self.metrics.clone();
        self.started.store(true, Ordering::Release);

        info!(sinks = sinks.len(), "NotifyQueue: worker started with {} sinks", sinks.len());

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            break;
                        }
                    }
                    job = receiver.recv() => {
                        let Some(job) = job else { break };
                        deliver_to_all(&sinks, &job, metrics.as_deref()).await;
                    }
                }
            }
            info!("NotifyQueue: worker stopped");
        });

        Some(handle)
    }
}

async fn deliver_to_all(
    sinks: &[Arc<dyn NotificationSink>],
    job: &NotificationJob,
    metrics: Option<&Metrics>,
) {
    let mut delivered = false;

    for sink in sinks {
        match sink.deliver(job).await {
            Ok(()) => {
                delivered = true;
                debug!(sink = sink.name(), symbol = %job.symbol, cycle = %job.cycle, "NotifyQueue: delivered {} {}", job.symbol, job.cycle);
            }
            Err(e) => {
                warn!(
                    sink = sink.name(),
                    symbol = %job.symbol,
                    cycle = %job.cycle,
                    error = %e,
                    "NotifyQueue: delivery via {} failed for {}",
                    sink.name(),
                    job.symbol
                );
                if let Some(m) = metrics {
                    m.notifications_failed_total.inc();
                }
            }
        }
    }

    if delivered {
        if let Some(m) = metrics {
            m.notifications_dispatched_total.inc();
        }
    }
}
