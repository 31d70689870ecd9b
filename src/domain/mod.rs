//! Domain layer - Monitor records and metric label tuples.
//!
//! Pure data types with no I/O. Everything here is serializable and
//! testable in isolation.

pub mod labels;
pub mod metric;
pub mod monitor;

// Re-export core types for convenience
pub use labels::LabelSet;
pub use metric::MonitorMetric;
pub use monitor::{
    CertInfo, Heartbeat, MonitorDescriptor, MonitorId, MonitorTag, TlsInfo,
};
