//! Metrics Adapters
//!
//! Provides the Prometheus gauge collectors and the axum server
//! exposing /metrics, health checks and monitor ingest routes.

pub mod prometheus;
pub mod server;

pub use self::prometheus::PrometheusGauges;
pub use server::MetricsServer;
