//! Use Cases Layer - Application Business Logic
//!
//! Orchestrates domain types with the port interfaces.
//!
//! Use cases:
//! - `MonitorMetrics`: Per-monitor heartbeat → gauge translation
//! - `MonitorMetricsService`: Watch/unwatch lifecycle across monitors

pub mod metrics_service;
pub mod monitor_metrics;

pub use metrics_service::MonitorMetricsService;
pub use monitor_metrics::{MetricsContext, MonitorMetrics, PendingMonitorMetrics};
