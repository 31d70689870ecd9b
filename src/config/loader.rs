//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters,
//! and providing clear error messages for misconfiguration.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;
use crate::domain::labels::is_fixed_label;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config = parse_config(&content)?;

  info!(
    monitors = config.monitors.len(),
    tag_labels = config.metrics.tag_labels.len(),
    data_dir = %config.storage.data_dir,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  let config: AppConfig =
    toml::from_str(content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  Ok(config)
}

/// Validate all configuration parameters.
///
/// Checks for:
/// - Well-formed, unique tag label names outside the fixed schema
/// - Positive enrichment timeout and queue size
/// - Unique monitor ids
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.exporter.name.is_empty(),
    "exporter.name must not be empty"
  );
  anyhow::ensure!(
    !config.metrics.bind_address.is_empty(),
    "metrics.bind_address must not be empty"
  );

  // Label schema validation
  let mut seen = HashSet::new();
  for label in &config.metrics.tag_labels {
    anyhow::ensure!(
      is_valid_label_name(label),
      "Tag label {label:?} is not a valid Prometheus label name"
    );
    anyhow::ensure!(
      !is_fixed_label(label),
      "Tag label {label:?} duplicates a fixed label"
    );
    anyhow::ensure!(
      seen.insert(label.as_str()),
      "Tag label {label:?} listed twice"
    );
  }

  // Enrichment validation
  anyhow::ensure!(
    config.enrichment.timeout_ms > 0,
    "enrichment.timeout_ms must be positive"
  );
  anyhow::ensure!(
    config.enrichment.max_pending_updates > 0,
    "enrichment.max_pending_updates must be positive"
  );

  // Monitor validation
  let mut ids = HashSet::new();
  for monitor in &config.monitors {
    anyhow::ensure!(
      ids.insert(monitor.id),
      "Monitor id {} configured twice",
      monitor.id
    );
  }

  Ok(())
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, excluding the reserved `__` prefix.
fn is_valid_label_name(name: &str) -> bool {
  let mut chars = name.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  (first.is_ascii_alphabetic() || first == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    && !name.starts_with("__")
}

#[cfg(test)]
mod tests {
  use super::*;

  const MINIMAL: &str = r#"
    [exporter]
    name = "edge-exporter"
  "#;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = tokio_test::assert_ok!(parse_config(MINIMAL));
    assert_eq!(config.exporter.log_level, "info");
    assert_eq!(config.metrics.bind_address, "0.0.0.0:9090");
    assert!(config.metrics.tag_labels.is_empty());
    assert_eq!(config.storage.data_dir, "data");
    assert_eq!(config.enrichment.timeout_ms, 5_000);
    assert_eq!(config.enrichment.max_pending_updates, 32);
    assert!(config.monitors.is_empty());
  }

  #[test]
  fn test_full_config() {
    let config = parse_config(
      r#"
      [exporter]
      name = "edge"
      log_level = "debug"

      [metrics]
      bind_address = "127.0.0.1:9100"
      tag_labels = ["team", "env"]

      [enrichment]
      timeout_ms = 250

      [[monitors]]
      id = 1
      name = "api"
      type = "http"
      url = "https://api.example.com"

      [[monitors]]
      id = 2
      hostname = "db.internal"
      port = 5432
      "#,
    )
    .unwrap();

    assert_eq!(config.metrics.tag_labels, vec!["team", "env"]);
    assert_eq!(config.enrichment.timeout().as_millis(), 250);
    assert_eq!(config.monitors.len(), 2);
    assert_eq!(config.monitors[0].monitor_type.as_deref(), Some("http"));
    assert_eq!(config.monitors[1].port, Some(5432));
  }

  #[test]
  fn test_rejects_bad_tag_labels() {
    for labels in [
      r#"["has space"]"#,
      r#"["1starts_with_digit"]"#,
      r#"["__reserved"]"#,
      r#"["region"]"#,
      r#"["team", "team"]"#,
    ] {
      let toml = format!("{MINIMAL}\n[metrics]\ntag_labels = {labels}\n");
      tokio_test::assert_err!(parse_config(&toml), "accepted {labels}");
    }
  }

  #[test]
  fn test_rejects_duplicate_monitor_ids() {
    let toml = format!("{MINIMAL}\n[[monitors]]\nid = 1\n[[monitors]]\nid = 1\n");
    assert!(parse_config(&toml).is_err());
  }

  #[test]
  fn test_rejects_zero_timeout() {
    let toml = format!("{MINIMAL}\n[enrichment]\ntimeout_ms = 0\n");
    assert!(parse_config(&toml).is_err());
  }
}
