//! Configuration Module - TOML-based Exporter Configuration
//!
//! Loads and validates configuration from `config.toml`.
//! The tag-label allow-list, storage location and enrichment bounds
//! are externalized here - nothing is hardcoded in the usecases layer.

pub mod loader;

use std::time::Duration;

use serde::Deserialize;

use crate::domain::monitor::MonitorDescriptor;

/// Top-level exporter configuration.
///
/// Loaded from `config.toml` at startup. All fields are validated
/// before any monitor is watched.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Exporter identity and logging.
  pub exporter: ExporterConfig,
  /// Metrics server and label schema.
  #[serde(default)]
  pub metrics: MetricsConfig,
  /// Tag storage location.
  #[serde(default)]
  pub storage: StorageConfig,
  /// Tag enrichment bounds.
  #[serde(default)]
  pub enrichment: EnrichmentConfig,
  /// Monitors watched at startup.
  #[serde(default)]
  pub monitors: Vec<MonitorDescriptor>,
}

/// Exporter identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ExporterConfig {
  /// Human-readable instance name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Metrics server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Bind address for /metrics, health and ingest routes.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Tag names exported as labels in addition to the fixed fourteen.
  #[serde(default)]
  pub tag_labels: Vec<String>,
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      bind_address: default_metrics_addr(),
      tag_labels: Vec::new(),
    }
  }
}

/// Tag storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
  /// Directory holding tags.jsonl and monitor_tags.jsonl.
  #[serde(default = "default_data_dir")]
  pub data_dir: String,
}

impl Default for StorageConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
    }
  }
}

/// Tag enrichment configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
  /// Maximum time to wait for the tag lookup (milliseconds).
  #[serde(default = "default_enrich_timeout")]
  pub timeout_ms: u64,
  /// Heartbeats buffered per monitor while enrichment runs.
  #[serde(default = "default_max_pending")]
  pub max_pending_updates: usize,
}

impl EnrichmentConfig {
  /// Enrichment timeout as a `Duration`.
  pub const fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

impl Default for EnrichmentConfig {
  fn default() -> Self {
    Self {
      timeout_ms: default_enrich_timeout(),
      max_pending_updates: default_max_pending(),
    }
  }
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_data_dir() -> String {
  "data".to_string()
}

const fn default_enrich_timeout() -> u64 {
  5_000
}

const fn default_max_pending() -> usize {
  32
}
