//! Label tuple identifying one monitor's series.
//!
//! Every gauge series the exporter writes is keyed by a [`LabelSet`]:
//! five identity labels taken from the monitor descriptor, nine
//! topology labels that tags may fill, and any further tag labels.

use std::collections::BTreeMap;

use tracing::warn;

use super::monitor::{MonitorDescriptor, MonitorTag};

/// Labels derived from the monitor descriptor.
pub const IDENTITY_LABELS: [&str; 5] = [
    "monitor_name",
    "monitor_type",
    "monitor_url",
    "monitor_hostname",
    "monitor_port",
];

/// Location and topology labels, filled from tags of the same name.
pub const TOPOLOGY_LABELS: [&str; 9] = [
    "location",
    "region",
    "datacenter",
    "cloud_provider",
    "az",
    "rack",
    "shelf",
    "room",
    "floor",
];

/// All fixed label names, in schema order.
pub fn fixed_labels() -> impl Iterator<Item = &'static str> {
    IDENTITY_LABELS.into_iter().chain(TOPOLOGY_LABELS)
}

/// Whether `name` is one of the fourteen fixed label names.
pub fn is_fixed_label(name: &str) -> bool {
    fixed_labels().any(|l| l == name)
}

/// Ordered label-name → label-value mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LabelSet {
    labels: BTreeMap<String, String>,
}

impl LabelSet {
    /// Identity labels for a monitor. Absent descriptor fields map to `""`.
    pub fn identity(monitor: &MonitorDescriptor) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        let mut labels = BTreeMap::new();
        labels.insert("monitor_name".to_string(), text(&monitor.name));
        labels.insert("monitor_type".to_string(), text(&monitor.monitor_type));
        labels.insert("monitor_url".to_string(), text(&monitor.url));
        labels.insert("monitor_hostname".to_string(), text(&monitor.hostname));
        labels.insert(
            "monitor_port".to_string(),
            monitor.port.map(|p| p.to_string()).unwrap_or_default(),
        );

        Self { labels }
    }

    /// Merge storage tags into the set.
    ///
    /// Identity labels cannot be overridden; such tags are skipped with a
    /// warning, as are tags without a name. A later tag with the same
    /// name wins over an earlier one.
    pub fn extend_tags(&mut self, tags: &[MonitorTag]) {
        for tag in tags {
            if tag.name.is_empty() {
                warn!(value = %tag.value, "Skipping tag with empty name");
                continue;
            }
            if IDENTITY_LABELS.contains(&tag.name.as_str()) {
                warn!(
                    tag = %tag.name,
                    "Tag shadows an identity label, ignoring"
                );
                continue;
            }
            self.labels.insert(tag.name.clone(), tag.value.clone());
        }
    }

    /// Value of a label, if set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.labels.get(name).map(String::as_str)
    }

    /// Whether a label is set.
    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Labels in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of labels set.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no label is set.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
