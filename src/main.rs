//! Monitor Metrics Exporter — Entry Point
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Register the monitor gauges (fixed labels + tag allow-list)
//! 4. Open the JSONL tag store
//! 5. Create the MonitorMetricsService and watch configured monitors
//! 6. Spawn the metrics server (/metrics, /live, /ready, ingest routes)
//! 7. Wait for SIGINT → graceful shutdown (stop server → drop series → exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

use monitor_metrics_exporter::adapters::metrics::{MetricsServer, PrometheusGauges};
use monitor_metrics_exporter::adapters::persistence::JsonlTagStore;
use monitor_metrics_exporter::config;
use monitor_metrics_exporter::ports::{GaugeSink, TagStore};
use monitor_metrics_exporter::usecases::{MetricsContext, MonitorMetricsService};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config_path =
        std::env::var("EXPORTER_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.exporter.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.exporter.name,
        version = env!("CARGO_PKG_VERSION"),
        monitors = config.monitors.len(),
        "Starting monitor metrics exporter"
    );

    // ── 3. Register monitor gauges ──────────────────────────
    let gauges = Arc::new(
        PrometheusGauges::new(&config.metrics.tag_labels)
            .context("Failed to register monitor gauges")?,
    );

    // ── 4. Open tag store ───────────────────────────────────
    let tags: Arc<dyn TagStore> = Arc::new(JsonlTagStore::new(&config.storage.data_dir));
    if !tags.is_healthy().await {
        error!(
            data_dir = %config.storage.data_dir,
            "Tag data directory unreadable, monitors will export identity labels only"
        );
    }

    // ── 5. Create service and watch configured monitors ─────
    let ctx = MetricsContext::new(
        Arc::clone(&tags),
        Arc::clone(&gauges) as Arc<dyn GaugeSink>,
        config.enrichment.timeout(),
    );
    let service = MonitorMetricsService::new(ctx, config.enrichment.max_pending_updates);
    for monitor in config.monitors.iter().cloned() {
        drop(service.watch(monitor).await);
    }

    // ── 6. Spawn metrics server ─────────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let server = MetricsServer::new(
        service.clone(),
        Arc::clone(&gauges),
        Arc::clone(&tags),
        config.metrics.bind_address.clone(),
    );
    let server_shutdown = shutdown_tx.subscribe();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run(server_shutdown).await {
            error!(error = %e, "Metrics server failed");
        }
    });

    info!("Exporter is running");

    // ── 7. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c().await.context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    let _ = shutdown_tx.send(());
    let _ = tokio::time::timeout(Duration::from_secs(5), server_handle).await;

    service.unwatch_all().await;

    info!("Shutdown complete");
    Ok(())
}
