use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::config::ProbeConfig;

/// The strategy a probe used against an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeMode {
    /// GET `http://address/`
    Http,
    /// GET `https://address/`
    Https,
    /// TLS handshake and certificate expiry inspection
    Certificate,
}

impl ProbeMode {
    /// Certificate inspection takes priority over reachability.
    pub fn for_config(config: &ProbeConfig) -> Self {
        if config.check_cert_expiry() {
            ProbeMode::Certificate
        } else if config.use_tls() {
            ProbeMode::Https
        } else {
            ProbeMode::Http
        }
    }
}

impl fmt::Display for ProbeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeMode::Http => write!(f, "http"),
            ProbeMode::Https => write!(f, "https"),
            ProbeMode::Certificate => write!(f, "certificate"),
        }
    }
}

/// Outcome of probing a single address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub address: Ipv4Addr,
    pub mode: ProbeMode,
    pub healthy: bool,
    /// Why the address was marked unhealthy
    pub reason: Option<String>,
    pub duration_ms: u64,
}

impl ProbeResult {
    pub fn healthy(address: Ipv4Addr, mode: ProbeMode) -> Self {
        Self {
            address,
            mode,
            healthy: true,
            reason: None,
            duration_ms: 0,
        }
    }

    pub fn unhealthy(address: Ipv4Addr, mode: ProbeMode, reason: impl Into<String>) -> Self {
        Self {
            address,
            mode,
            healthy: false,
            reason: Some(reason.into()),
            duration_ms: 0,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_precedence() {
        let config = ProbeConfig::new();
        assert_eq!(ProbeMode::for_config(&config), ProbeMode::Http);

        let config = config.with_tls(true);
        assert_eq!(ProbeMode::for_config(&config), ProbeMode::Https);

        // Certificate mode wins regardless of the TLS flag
        let config = config.with_cert_expiry_check(true);
        assert_eq!(ProbeMode::for_config(&config), ProbeMode::Certificate);
        let config = config.with_tls(false);
        assert_eq!(ProbeMode::for_config(&config), ProbeMode::Certificate);
    }

    #[test]
    fn test_probe_result_serializes() {
        let result = ProbeResult::unhealthy(
            Ipv4Addr::new(192, 0, 2, 7),
            ProbeMode::Https,
            "request failed: connection refused",
        )
        .with_duration_ms(12);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["address"], "192.0.2.7");
        assert_eq!(json["mode"], "https");
        assert_eq!(json["healthy"], false);
        assert_eq!(json["reason"], "request failed: connection refused");
        assert_eq!(json["duration_ms"], 12);
    }
}
