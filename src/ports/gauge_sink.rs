//! Gauge Sink Port - Labelled Gauge Mutation Interface
//!
//! Abstracts the process-wide gauge collectors so adapters can be
//! exercised against an isolated registry or a mock.

use thiserror::Error;

use crate::domain::labels::LabelSet;
use crate::domain::metric::MonitorMetric;

/// Failure to mutate a gauge series.
#[derive(Debug, Error)]
pub enum GaugeError {
    /// The label tuple names a label the gauge was not registered with.
    #[error("label `{label}` is not part of the {metric} label schema")]
    UnknownLabel {
        metric: MonitorMetric,
        label: String,
    },
    /// The underlying collector rejected the operation.
    #[error("collector error on {metric}: {source}")]
    Collector {
        metric: MonitorMetric,
        #[source]
        source: prometheus::Error,
    },
}

/// Shared set of labelled gauges.
///
/// Distinct label tuples never interfere with each other. Writing the
/// same tuple from two callers is last-write-wins.
pub trait GaugeSink: Send + Sync + 'static {
    /// Set the series identified by `labels` to `value`, creating it if needed.
    fn set(
        &self,
        metric: MonitorMetric,
        labels: &LabelSet,
        value: f64,
    ) -> Result<(), GaugeError>;

    /// Drop the series identified by `labels`. Absent series are not an error.
    fn remove(
        &self,
        metric: MonitorMetric,
        labels: &LabelSet,
    ) -> Result<(), GaugeError>;
}
