//! The four per-monitor gauges.

use std::fmt;

/// One of the gauges exported for every watched monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorMetric {
    /// Days until the TLS certificate expires.
    CertDaysRemaining,
    /// Whether the TLS certificate validated (1) or not (0).
    CertIsValid,
    /// Heartbeat latency in milliseconds, `-1` when not measured.
    ResponseTime,
    /// Heartbeat status code.
    Status,
}

impl MonitorMetric {
    /// All gauges, in registration order.
    pub const ALL: [Self; 4] = [
        Self::CertDaysRemaining,
        Self::CertIsValid,
        Self::ResponseTime,
        Self::Status,
    ];

    /// Exported metric name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CertDaysRemaining => "monitor_cert_days_remaining",
            Self::CertIsValid => "monitor_cert_is_valid",
            Self::ResponseTime => "monitor_response_time",
            Self::Status => "monitor_status",
        }
    }

    /// Exported help text.
    pub const fn help(self) -> &'static str {
        match self {
            Self::CertDaysRemaining => {
                "The number of days remaining until the certificate expires"
            }
            Self::CertIsValid => "Is the certificate still valid? (1 = Yes, 0= No)",
            Self::ResponseTime => "Monitor Response Time (ms)",
            Self::Status => "Monitor Status (1 = UP, 0= DOWN)",
        }
    }
}

impl fmt::Display for MonitorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
