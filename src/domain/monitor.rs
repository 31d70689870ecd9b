//! Monitor domain records.
//!
//! These are the already-computed inputs the exporter consumes: the
//! descriptor of a watched target, the result of one heartbeat, the
//! outcome of a TLS certificate check, and the tags attached to a
//! monitor in storage. JSON field names follow the monitoring
//! application that produces them.

use serde::{Deserialize, Serialize};

/// Identifier of a monitored target.
pub type MonitorId = u64;

/// Conventional heartbeat status codes.
pub mod status {
    /// Target did not respond as expected.
    pub const DOWN: i32 = 0;
    /// Target responded as expected.
    pub const UP: i32 = 1;
    /// Retrying before declaring the target down.
    pub const PENDING: i32 = 2;
    /// Target is inside a maintenance window.
    pub const MAINTENANCE: i32 = 3;
}

/// Identity of a monitored target.
///
/// Only `id` is required. Every other field may be absent and is
/// exported as an empty label value in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorDescriptor {
    /// Storage identifier, used to look up tags.
    pub id: MonitorId,
    /// Human-readable monitor name.
    #[serde(default)]
    pub name: Option<String>,
    /// Monitor kind (`http`, `keyword`, `port`, `dns`, ...).
    #[serde(default, rename = "type")]
    pub monitor_type: Option<String>,
    /// Checked URL, for HTTP-like monitors.
    #[serde(default)]
    pub url: Option<String>,
    /// Checked hostname, for host/port monitors.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Checked port, for host/port monitors.
    #[serde(default)]
    pub port: Option<u16>,
}

impl MonitorDescriptor {
    /// Descriptor carrying only an id.
    pub const fn new(id: MonitorId) -> Self {
        Self {
            id,
            name: None,
            monitor_type: None,
            url: None,
            hostname: None,
            port: None,
        }
    }
}

/// Result of a single health check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Status code, see [`status`].
    pub status: i32,
    /// Round-trip latency in milliseconds, if one was measured.
    #[serde(default)]
    pub ping: Option<f64>,
}

impl Heartbeat {
    /// Heartbeat without a latency measurement.
    pub const fn new(status: i32) -> Self {
        Self { status, ping: None }
    }

    /// Heartbeat with a latency measurement.
    pub const fn with_ping(status: i32, ping: f64) -> Self {
        Self {
            status,
            ping: Some(ping),
        }
    }
}

/// Certificate details extracted by the TLS check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertInfo {
    /// Days until the leaf certificate expires (negative once expired).
    pub days_remaining: i64,
}

/// Outcome of a TLS certificate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsInfo {
    /// Whether the presented chain validated.
    pub valid: bool,
    /// Certificate details, when the check got far enough to read them.
    #[serde(default)]
    pub cert_info: Option<CertInfo>,
}

/// A `(name, value)` tag pair attached to a monitor in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorTag {
    /// Tag definition name; becomes the label name.
    pub name: String,
    /// Value set on this monitor; becomes the label value.
    #[serde(default)]
    pub value: String,
}

impl MonitorTag {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_missing_fields_default_to_none() {
        let d: MonitorDescriptor = serde_json::from_str(r#"{"id": 7}"#).unwrap();
        assert_eq!(d, MonitorDescriptor::new(7));
    }

    #[test]
    fn test_descriptor_type_field_renamed() {
        let d: MonitorDescriptor = serde_json::from_str(
            r#"{"id": 1, "name": "api", "type": "http", "url": "https://a.example", "port": 443}"#,
        )
        .unwrap();
        assert_eq!(d.monitor_type.as_deref(), Some("http"));
        assert_eq!(d.port, Some(443));
    }

    #[test]
    fn test_tls_info_camel_case() {
        let tls: TlsInfo =
            serde_json::from_str(r#"{"valid": true, "certInfo": {"daysRemaining": 12}}"#)
                .unwrap();
        assert!(tls.valid);
        assert_eq!(tls.cert_info, Some(CertInfo { days_remaining: 12 }));

        let bare: TlsInfo = serde_json::from_str(r#"{"valid": false}"#).unwrap();
        assert!(bare.cert_info.is_none());
    }

    #[test]
    fn test_heartbeat_without_ping() {
        let hb: Heartbeat = serde_json::from_str(r#"{"status": 1}"#).unwrap();
        assert_eq!(hb, Heartbeat::new(status::UP));
    }
}
