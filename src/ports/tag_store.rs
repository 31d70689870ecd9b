//! Tag Store Port - Monitor Tag Lookup Interface
//!
//! The exporter never writes tags. It only asks storage for the
//! `(name, value)` pairs attached to a monitor so they can become
//! labels on that monitor's series.

use async_trait::async_trait;

use crate::domain::monitor::{MonitorId, MonitorTag};

/// Read-only source of monitor tags.
///
/// Implementations join per-monitor tag rows against tag definitions
/// and return one entry per row, in storage order.
#[async_trait]
pub trait TagStore: Send + Sync + 'static {
    /// All tags attached to a monitor. Unknown monitors yield an empty list.
    async fn monitor_tags(
        &self,
        monitor_id: MonitorId,
    ) -> anyhow::Result<Vec<MonitorTag>>;

    /// Check if the backing storage is reachable.
    async fn is_healthy(&self) -> bool;
}
