//! Signalwatch Worker
//!
//! Tracks every listed perpetual contract, evaluates the configured cycles on
//! their boundaries and posts alerts to Telegram.

use dotenvy::dotenv;
use signalwatch::config::AppConfig;
use signalwatch::core::funding::FundingRefresher;
use signalwatch::core::http::{start_server, AppState};
use signalwatch::core::runtime::SignalRuntime;
use signalwatch::db::{PostgresStore, RegistryStore, SubscriptionDirectory};
use signalwatch::jobs::context::JobContext;
use signalwatch::logging;
use signalwatch::metrics::Metrics;
use signalwatch::registry::InstrumentRegistry;
use signalwatch::services::binance::BinanceFuturesClient;
use signalwatch::services::market_data::MarketDataProvider;
use signalwatch::services::notify::{
    NotificationSink, NotifyQueue, SubscriberSink, TelegramClient, TelegramTopicSink,
};
use signalwatch::signals::engine::SignalEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let env = signalwatch::config::get_environment();
    info!("Starting Signalwatch Worker");
    info!(environment = %env, "Environment");

    let config = AppConfig::load().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;
    info!(
        mode = ?config.mode,
        cycles = ?config.cycles.iter().map(|c| c.cycle.as_str()).collect::<Vec<_>>(),
        "Configuration loaded"
    );

    let metrics = Arc::new(Metrics::new()?);
    let registry = Arc::new(InstrumentRegistry::new());

    let binance = BinanceFuturesClient::new(
        config.binance.base_url.clone(),
        Duration::from_secs(config.binance.request_timeout_secs),
    )?;
    let provider: Arc<dyn MarketDataProvider> = Arc::new(binance);

    // Postgres is optional: without it records stay in memory
    let database = match &config.database.url {
        Some(url) => match PostgresStore::connect(url).await {
            Ok(store) => {
                metrics.database_connected.set(1.0);
                let store = Arc::new(store);
                if let Err(e) = store.sanitize().await {
                    warn!(error = %e, "Startup sanitize sweep failed");
                }
                Some(store)
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect to Postgres, persistence disabled");
                None
            }
        },
        None => {
            info!("No database configured, persistence disabled");
            None
        }
    };

    let refresher = {
        let mut refresher = FundingRefresher::new(provider.clone(), registry.clone())
            .with_metrics(metrics.clone());
        if let Some(store) = &database {
            refresher = refresher.with_store(store.clone() as Arc<dyn RegistryStore>);
        }
        refresher
    };

    match refresher.sync_symbols().await {
        Ok(summary) => info!(added = summary.added, "Tracking {} instruments", summary.added),
        Err(e) => warn!(error = %e, "Initial symbol discovery failed, retrying on the next hourly refresh"),
    }

    let engine = Arc::new(SignalEngine::new(config.benchmark));
    let mut job_context = JobContext::new(provider.clone(), registry.clone(), engine)
        .with_metrics(metrics.clone())
        .with_stale_grace(config.stale_grace());
    if let Some(store) = &database {
        job_context = job_context.with_store(store.clone() as Arc<dyn RegistryStore>);
    }

    let mut sinks: Vec<Arc<dyn NotificationSink>> = Vec::new();
    if config.notify.is_active() {
        let client = TelegramClient::new(
            config.notify.api_base.clone(),
            config.notify.token.clone(),
            Duration::from_secs(config.notify.request_timeout_secs),
        )?;
        sinks.push(Arc::new(TelegramTopicSink::new(
            client.clone(),
            config.notify.group.clone(),
            config.notify.topics.clone(),
        )));
        if config.notify.subscribers {
            if let Some(store) = &database {
                let directory = store.clone() as Arc<dyn SubscriptionDirectory>;
                sinks.push(Arc::new(SubscriberSink::new(client, directory)));
            }
        }
        let queue = Arc::new(NotifyQueue::new(
            config.notify.queue_capacity,
            Some(metrics.clone()),
        ));
        job_context = job_context.with_notifier(queue);
    } else {
        info!("Notifications disabled");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut runtime = SignalRuntime::new(&config, Arc::new(job_context)).with_refresher(refresher);
    for sink in sinks {
        runtime = runtime.with_sink(sink);
    }
    let mut handles = runtime
        .start(shutdown_rx.clone())
        .await
        .map_err(|e| format!("Failed to start runtime: {}", e))?;

    if config.http.enabled {
        let state = AppState::new(metrics.clone(), registry.clone());
        let port = config.http.port;
        let http_shutdown = shutdown_rx.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = start_server(port, state, http_shutdown).await {
                error!(error = %e, "HTTP server error");
            }
        }));
    }

    info!("Worker started, waiting for shutdown signal...");
    wait_for_signal().await;

    info!("Shutting down worker...");
    let _ = shutdown_tx.send(true);
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "Task ended abnormally");
        }
    }
    info!("Worker stopped");

    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal as unix_signal, SignalKind};

    match unix_signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            warn!(error = %e, "Failed to install SIGTERM handler");
            let _ = signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = signal::ctrl_c().await;
}
