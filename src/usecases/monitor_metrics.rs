//! Monitor Metrics - Heartbeat to Gauge Translation
//!
//! One `MonitorMetrics` exists per watched monitor. It owns the
//! monitor's label tuple and turns every heartbeat (plus the optional
//! TLS check result) into gauge mutations on the shared `GaugeSink`.
//!
//! Construction is two-phase. `begin` builds the identity labels
//! synchronously and returns a `PendingMonitorMetrics`; `enrich` adds
//! the tags from storage and yields the active adapter. No series is
//! written before enrichment settles, so an adapter keeps a single
//! label tuple for its whole life and `remove` always targets the
//! series `update` created.
//!
//! Nothing here returns an error. Metric failures are diagnostics,
//! reported through `tracing` and never propagated into the
//! monitoring pipeline.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::domain::labels::LabelSet;
use crate::domain::metric::MonitorMetric;
use crate::domain::monitor::{Heartbeat, MonitorDescriptor, MonitorId, TlsInfo};
use crate::ports::gauge_sink::GaugeSink;
use crate::ports::tag_store::TagStore;

/// Response time exported when a heartbeat carries no latency.
pub const NO_MEASUREMENT: f64 = -1.0;

/// Collaborators shared by every monitor adapter.
#[derive(Clone)]
pub struct MetricsContext {
    /// Tag lookup used during enrichment.
    pub tags: Arc<dyn TagStore>,
    /// Gauges all adapters write to.
    pub gauges: Arc<dyn GaugeSink>,
    /// Upper bound on the tag lookup.
    pub enrich_timeout: Duration,
}

impl MetricsContext {
    pub fn new(
        tags: Arc<dyn TagStore>,
        gauges: Arc<dyn GaugeSink>,
        enrich_timeout: Duration,
    ) -> Self {
        Self {
            tags,
            gauges,
            enrich_timeout,
        }
    }
}

/// Adapter whose tags have not been loaded yet.
pub struct PendingMonitorMetrics {
    monitor_id: MonitorId,
    labels: LabelSet,
    ctx: MetricsContext,
}

impl PendingMonitorMetrics {
    pub const fn monitor_id(&self) -> MonitorId {
        self.monitor_id
    }

    /// Identity labels, available before enrichment.
    pub const fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Load the monitor's tags and activate the adapter.
    ///
    /// A failed, panicked or timed-out lookup leaves the identity
    /// labels only. The lookup runs in its own task so a panicking
    /// `TagStore` cannot unwind through the caller.
    #[instrument(skip(self), fields(monitor_id = self.monitor_id))]
    pub async fn enrich(self) -> MonitorMetrics {
        let Self {
            monitor_id,
            mut labels,
            ctx,
        } = self;

        let tags = Arc::clone(&ctx.tags);
        let mut lookup = tokio::spawn(async move { tags.monitor_tags(monitor_id).await });

        match tokio::time::timeout(ctx.enrich_timeout, &mut lookup).await {
            Ok(Ok(Ok(tags))) => {
                for tag in &tags {
                    debug!(tag = %tag.name, value = %tag.value, "Adding tag label");
                }
                labels.extend_tags(&tags);
            }
            Ok(Ok(Err(e))) => {
                warn!(
                    error = %e,
                    "Tag lookup failed, exporting identity labels only"
                );
            }
            Ok(Err(e)) => {
                warn!(
                    error = %e,
                    "Tag lookup task failed, exporting identity labels only"
                );
            }
            Err(_) => {
                lookup.abort();
                warn!(
                    timeout = ?ctx.enrich_timeout,
                    "Tag lookup timed out, exporting identity labels only"
                );
            }
        }

        MonitorMetrics {
            monitor_id,
            labels,
            gauges: ctx.gauges,
            removed: false,
        }
    }
}

/// Active per-monitor gauge writer.
pub struct MonitorMetrics {
    monitor_id: MonitorId,
    labels: LabelSet,
    gauges: Arc<dyn GaugeSink>,
    removed: bool,
}

impl MonitorMetrics {
    /// Start watching a monitor: identity labels now, tags on `enrich`.
    pub fn begin(
        monitor: &MonitorDescriptor,
        ctx: &MetricsContext,
    ) -> PendingMonitorMetrics {
        PendingMonitorMetrics {
            monitor_id: monitor.id,
            labels: LabelSet::identity(monitor),
            ctx: ctx.clone(),
        }
    }

    /// `begin` followed by `enrich`.
    pub async fn create(monitor: &MonitorDescriptor, ctx: &MetricsContext) -> Self {
        Self::begin(monitor, ctx).enrich().await
    }

    pub const fn monitor_id(&self) -> MonitorId {
        self.monitor_id
    }

    /// The final label tuple of this monitor's series.
    pub const fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Whether `remove` has been called.
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    /// Export one heartbeat and, if present, the TLS check result.
    ///
    /// Status and response time are always written. Certificate
    /// validity is written only with a TLS result, and days remaining
    /// only when that result carries certificate details; otherwise
    /// the previous value stays. Each gauge is written independently.
    pub fn update(&self, heartbeat: &Heartbeat, tls: Option<&TlsInfo>) {
        if self.removed {
            debug!(monitor_id = self.monitor_id, "Ignoring update after removal");
            return;
        }

        if let Some(tls) = tls {
            self.set(MonitorMetric::CertIsValid, if tls.valid { 1.0 } else { 0.0 });

            if let Some(cert) = tls.cert_info {
                #[allow(clippy::cast_precision_loss)]
                let days = cert.days_remaining as f64;
                self.set(MonitorMetric::CertDaysRemaining, days);
            }
        }

        self.set(MonitorMetric::Status, f64::from(heartbeat.status));
        self.set(
            MonitorMetric::ResponseTime,
            heartbeat.ping.unwrap_or(NO_MEASUREMENT),
        );
    }

    /// Drop this monitor's series from all four gauges.
    ///
    /// Safe to call more than once. Later `update` calls are ignored.
    pub fn remove(&mut self) {
        if self.removed {
            debug!(monitor_id = self.monitor_id, "Series already removed");
            return;
        }

        for metric in MonitorMetric::ALL {
            if let Err(e) = self.gauges.remove(metric, &self.labels) {
                error!(
                    monitor_id = self.monitor_id,
                    %metric,
                    error = %e,
                    "Failed to remove monitor series"
                );
            }
        }

        self.removed = true;
        info!(monitor_id = self.monitor_id, "Monitor series removed");
    }

    fn set(&self, metric: MonitorMetric, value: f64) {
        if let Err(e) = self.gauges.set(metric, &self.labels, value) {
            error!(
                monitor_id = self.monitor_id,
                %metric,
                error = %e,
                "Failed to set monitor gauge"
            );
        }
    }
}
