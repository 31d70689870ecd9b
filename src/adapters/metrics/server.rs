//! Metrics Server - Scrape, Health and Ingest Endpoints
//!
//! Serves the monitor gauges and accepts monitor lifecycle events
//! over HTTP via axum 0.7:
//! - `GET /metrics`: Prometheus text exposition
//! - `GET /live`: liveness check
//! - `GET /ready`: readiness check (tag store reachable)
//! - `POST /monitors`: start watching a monitor
//! - `POST /monitors/:id/heartbeats`: export a heartbeat
//! - `DELETE /monitors/:id`: stop watching a monitor

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info, instrument};

use super::prometheus::PrometheusGauges;
use crate::domain::monitor::{Heartbeat, MonitorDescriptor, MonitorId, TlsInfo};
use crate::ports::tag_store::TagStore;
use crate::usecases::metrics_service::MonitorMetricsService;

/// Body of `POST /monitors/:id/heartbeats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatEvent {
    /// Health check result.
    pub heartbeat: Heartbeat,
    /// TLS check result, for monitors that perform one.
    #[serde(default)]
    pub tls: Option<TlsInfo>,
}

/// State shared by all handlers.
#[derive(Clone)]
struct ServerState {
    service: MonitorMetricsService,
    gauges: Arc<PrometheusGauges>,
    tags: Arc<dyn TagStore>,
}

/// Axum-based metrics and ingest server.
pub struct MetricsServer {
    state: ServerState,
    /// Bind address (default 0.0.0.0:9090 from config).
    bind_address: String,
}

impl MetricsServer {
    /// Create a new metrics server.
    pub fn new(
        service: MonitorMetricsService,
        gauges: Arc<PrometheusGauges>,
        tags: Arc<dyn TagStore>,
        bind_address: impl Into<String>,
    ) -> Self {
        Self {
            state: ServerState {
                service,
                gauges,
                tags,
            },
            bind_address: bind_address.into(),
        }
    }

    /// Build the router without binding a socket.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/metrics", get(Self::metrics))
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .route("/monitors", post(Self::watch_monitor))
            .route("/monitors/:id", delete(Self::unwatch_monitor))
            .route("/monitors/:id/heartbeats", post(Self::record_heartbeat))
            .with_state(self.state.clone())
    }

    /// Bind the configured address and serve until shutdown.
    #[instrument(skip(self, shutdown_rx), fields(address = %self.bind_address))]
    pub async fn run(self, shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.bind_address).await?;
        self.serve(listener, shutdown_rx).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve(
        self,
        listener: TcpListener,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let app = self.router();

        info!(address = %listener.local_addr()?, "Metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    async fn metrics(State(state): State<ServerState>) -> Response {
        match state.gauges.render() {
            Ok(body) => (
                [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
                body,
            )
                .into_response(),
            Err(e) => {
                error!(error = %e, "Failed to render metrics");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }

    /// Liveness check: always returns 200 if the process is running.
    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    /// Readiness check: returns 200 only if tag storage is reachable.
    async fn readiness(State(state): State<ServerState>) -> impl IntoResponse {
        if state.tags.is_healthy().await {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }

    async fn watch_monitor(
        State(state): State<ServerState>,
        Json(monitor): Json<MonitorDescriptor>,
    ) -> StatusCode {
        // Enrichment settles in the background; the handle is not awaited.
        drop(state.service.watch(monitor).await);
        StatusCode::ACCEPTED
    }

    async fn record_heartbeat(
        State(state): State<ServerState>,
        Path(id): Path<MonitorId>,
        Json(event): Json<HeartbeatEvent>,
    ) -> StatusCode {
        if state.service.record(id, event.heartbeat, event.tls).await {
            StatusCode::ACCEPTED
        } else {
            StatusCode::NOT_FOUND
        }
    }

    async fn unwatch_monitor(
        State(state): State<ServerState>,
        Path(id): Path<MonitorId>,
    ) -> StatusCode {
        if state.service.unwatch(id).await {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::NOT_FOUND
        }
    }
}
