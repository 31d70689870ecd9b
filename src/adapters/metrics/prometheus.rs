//! Prometheus Gauges - Per-Monitor Health Series
//!
//! Registers the four monitor gauges on a dedicated registry and
//! implements the `GaugeSink` port on top of `prometheus::GaugeVec`.
//! The label schema is the fourteen fixed labels plus an allow-list
//! of tag labels from config; `GaugeVec` fixes label names at
//! registration, so tags outside the allow-list cannot be exported.

use std::collections::HashMap;

use anyhow::Context;
use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};
use tracing::{debug, info};

use crate::domain::labels::{LabelSet, fixed_labels};
use crate::domain::metric::MonitorMetric;
use crate::ports::gauge_sink::{GaugeError, GaugeSink};

/// The four monitor gauges and the registry they are exposed from.
///
/// Each instance owns its registry, so tests can run side by side
/// without sharing series.
pub struct PrometheusGauges {
    /// Prometheus registry.
    registry: Registry,
    /// Declared label names, fixed labels first.
    schema: Vec<String>,
    /// Certificate days remaining.
    cert_days_remaining: GaugeVec,
    /// Certificate validity (1 = valid, 0 = invalid).
    cert_is_valid: GaugeVec,
    /// Response time in milliseconds.
    response_time: GaugeVec,
    /// Monitor status code.
    status: GaugeVec,
}

impl PrometheusGauges {
    /// Create and register the monitor gauges.
    ///
    /// `tag_labels` are extra label names tags may use; duplicates of
    /// fixed labels are ignored.
    pub fn new(tag_labels: &[String]) -> anyhow::Result<Self> {
        let registry = Registry::new();

        let mut schema: Vec<String> = fixed_labels().map(str::to_string).collect();
        for label in tag_labels {
            if !schema.contains(label) {
                schema.push(label.clone());
            }
        }
        let names: Vec<&str> = schema.iter().map(String::as_str).collect();

        let gauge = |metric: MonitorMetric| {
            GaugeVec::new(Opts::new(metric.name(), metric.help()), &names)
                .with_context(|| format!("Failed to create gauge {metric}"))
        };

        let cert_days_remaining = gauge(MonitorMetric::CertDaysRemaining)?;
        let cert_is_valid = gauge(MonitorMetric::CertIsValid)?;
        let response_time = gauge(MonitorMetric::ResponseTime)?;
        let status = gauge(MonitorMetric::Status)?;

        // Register all metrics
        registry.register(Box::new(cert_days_remaining.clone()))?;
        registry.register(Box::new(cert_is_valid.clone()))?;
        registry.register(Box::new(response_time.clone()))?;
        registry.register(Box::new(status.clone()))?;

        info!(
            labels = schema.len(),
            tag_labels = schema.len() - fixed_labels().count(),
            "Monitor gauges registered"
        );

        Ok(Self {
            registry,
            schema,
            cert_days_remaining,
            cert_is_valid,
            response_time,
            status,
        })
    }

    /// Declared label names.
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Encode the registry in the Prometheus text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .context("Failed to encode metrics")?;
        String::from_utf8(buffer).context("Metrics output is not UTF-8")
    }

    /// Current value of a series, if it exists.
    pub fn value(&self, metric: MonitorMetric, labels: &LabelSet) -> Option<f64> {
        let wanted = self.project(metric, labels).ok()?;

        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == metric.name())
            .flat_map(|family| family.get_metric())
            .find(|m| {
                m.get_label().len() == wanted.len()
                    && m.get_label().iter().all(|pair| {
                        wanted.get(pair.get_name()) == Some(&pair.get_value())
                    })
            })
            .map(|m| m.get_gauge().get_value())
    }

    /// Number of live series for a gauge.
    pub fn series_count(&self, metric: MonitorMetric) -> usize {
        self.registry
            .gather()
            .iter()
            .filter(|family| family.get_name() == metric.name())
            .map(|family| family.get_metric().len())
            .sum()
    }

    const fn gauge(&self, metric: MonitorMetric) -> &GaugeVec {
        match metric {
            MonitorMetric::CertDaysRemaining => &self.cert_days_remaining,
            MonitorMetric::CertIsValid => &self.cert_is_valid,
            MonitorMetric::ResponseTime => &self.response_time,
            MonitorMetric::Status => &self.status,
        }
    }

    /// Map a label tuple onto the declared schema.
    ///
    /// Every schema label must be present for `GaugeVec`, so missing
    /// ones are exported as `""`. Labels outside the schema are rejected.
    fn project<'a>(
        &'a self,
        metric: MonitorMetric,
        labels: &'a LabelSet,
    ) -> Result<HashMap<&'a str, &'a str>, GaugeError> {
        if let Some((label, _)) = labels
            .iter()
            .find(|(name, _)| !self.schema.iter().any(|s| s == name))
        {
            return Err(GaugeError::UnknownLabel {
                metric,
                label: label.to_string(),
            });
        }

        Ok(self
            .schema
            .iter()
            .map(|name| (name.as_str(), labels.get(name).unwrap_or("")))
            .collect())
    }
}

impl GaugeSink for PrometheusGauges {
    fn set(
        &self,
        metric: MonitorMetric,
        labels: &LabelSet,
        value: f64,
    ) -> Result<(), GaugeError> {
        let projected = self.project(metric, labels)?;
        self.gauge(metric)
            .get_metric_with(&projected)
            .map_err(|source| GaugeError::Collector { metric, source })?
            .set(value);
        Ok(())
    }

    fn remove(
        &self,
        metric: MonitorMetric,
        labels: &LabelSet,
    ) -> Result<(), GaugeError> {
        let projected = self.project(metric, labels)?;
        // The projection always matches the schema, so the only failure
        // left is a series that was never created.
        if self.gauge(metric).remove(&projected).is_err() {
            debug!(%metric, "No series to remove");
        }
        Ok(())
    }
}
