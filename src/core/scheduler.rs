//! Cron-aligned scheduler running one evaluation pass per cycle boundary

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{CycleConfig, Mode};
use crate::jobs::context::JobContext;
use crate::jobs::handlers::run_evaluation_pass;
use crate::models::cycle::Cycle;

/// Sleep for `duration` unless shutdown is signalled first.
///
/// Returns `true` when the wait ended because of shutdown.
pub async fn sleep_or_shutdown(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if *shutdown.borrow() {
        return true;
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        changed = shutdown.changed() => changed.is_err() || *shutdown.borrow(),
    }
}

/// Scheduler driving the evaluation passes of a single cycle
pub struct CycleScheduler {
    ctx: Arc<JobContext>,
    cycle: Cycle,
    delay: Duration,
    mode: Mode,
    schedule: Schedule,
}

impl CycleScheduler {
    pub fn new(
        ctx: Arc<JobContext>,
        config: &CycleConfig,
        mode: Mode,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let cron_expr = config.cycle.cron_expression();
        let schedule = Schedule::from_str(cron_expr).map_err(|e| {
            format!(
                "Invalid cron expression '{}' for cycle {}: {}",
                cron_expr, config.cycle, e
            )
        })?;

        info!(
            cycle = %config.cycle,
            cron = %cron_expr,
            delay_minutes = config.delay_minutes,
            "CycleScheduler: created for {} (cron: {})",
            config.cycle,
            cron_expr
        );

        Ok(Self {
            ctx,
            cycle: config.cycle,
            delay: config.delay(),
            mode,
            schedule,
        })
    }

    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    /// First cycle boundary strictly after `after`.
    pub fn next_boundary(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        if self.mode == Mode::Dev {
            info!(cycle = %self.cycle, "CycleScheduler: dev mode, first {} pass starts now", self.cycle);
            self.fire(&shutdown);
        }

        loop {
            let now = Utc::now();
            let Some(next_tick) = self.next_boundary(now) else {
                debug!(cycle = %self.cycle, "CycleScheduler: no upcoming boundary, retrying in 60s");
                if sleep_or_shutdown(Duration::from_secs(60), &mut shutdown).await {
                    break;
                }
                continue;
            };

            let wait = (next_tick - now).to_std().unwrap_or_default();
            debug!(
                cycle = %self.cycle,
                next = %next_tick.format("%Y-%m-%d %H:%M:%S"),
                wait_secs = wait.as_secs(),
                "CycleScheduler: next {} pass at {}",
                self.cycle,
                next_tick.format("%H:%M:%S")
            );

            if sleep_or_shutdown(wait, &mut shutdown).await {
                break;
            }
            self.fire(&shutdown);
        }

        info!(cycle = %self.cycle, "CycleScheduler: {} stopped", self.cycle);
    }

    /// Spawn a detached pass that first waits out the stagger delay.
    fn fire(&self, shutdown: &watch::Receiver<bool>) {
        let ctx = self.ctx.clone();
        let cycle = self.cycle;
        let delay = self.delay;
        let mut shutdown = shutdown.clone();

        tokio::spawn(async move {
            if !delay.is_zero() && sleep_or_shutdown(delay, &mut shutdown).await {
                return;
            }
            run_evaluation_pass(&ctx, cycle, Utc::now()).await;
        });
    }
}
