use std::net::Ipv4Addr;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::cert::probe_certificate;
use super::config::ProbeConfig;
use super::http::probe_reachability;
use super::types::{ProbeMode, ProbeResult};

/// A health check that can be run against one address.
///
/// Implementations must not fail: every problem is reported through an
/// unhealthy [`ProbeResult`].
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, address: Ipv4Addr, config: &ProbeConfig) -> ProbeResult;
}

/// Runs the network probe selected by a [`ProbeConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProbeExecutor;

impl ProbeExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Probe one address. Certificate inspection takes priority when enabled,
    /// otherwise a single HTTP or HTTPS GET is issued.
    #[instrument(skip(self, config), fields(address = %address))]
    pub async fn execute(&self, address: Ipv4Addr, config: &ProbeConfig) -> ProbeResult {
        let mode = ProbeMode::for_config(config);
        let start = Instant::now();

        debug!(mode = %mode, "Probing address");

        let result = match mode {
            ProbeMode::Certificate => probe_certificate(address, config).await,
            ProbeMode::Http | ProbeMode::Https => probe_reachability(address, config).await,
        };
        let result = result.with_duration_ms(start.elapsed().as_millis() as u64);

        if result.healthy {
            debug!(duration_ms = result.duration_ms, "Address healthy");
        } else {
            warn!(
                reason = result.reason.as_deref().unwrap_or("unknown"),
                "Address unhealthy"
            );
        }

        result
    }
}

#[async_trait]
impl Probe for ProbeExecutor {
    async fn probe(&self, address: Ipv4Addr, config: &ProbeConfig) -> ProbeResult {
        self.execute(address, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::cert::tests::{certificate_expiring_in, serve_tls};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_execute_http_mode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let config = ProbeConfig::new().with_http_port(server.address().port());
        let result = ProbeExecutor::new()
            .execute(Ipv4Addr::LOCALHOST, &config)
            .await;

        assert!(result.healthy);
        assert_eq!(result.mode, ProbeMode::Http);
        assert_eq!(result.address, Ipv4Addr::LOCALHOST);
    }

    #[tokio::test]
    async fn test_certificate_mode_takes_priority() {
        let (cert, key) = certificate_expiring_in(10);
        let port = serve_tls(vec![cert], key).await;

        // An HTTP server on the HTTP port would be healthy; the certificate check must win.
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let config = ProbeConfig::new()
            .with_http_port(server.address().port())
            .with_https_port(port)
            .with_cert_expiry_check(true);
        let result = ProbeExecutor::new()
            .execute(Ipv4Addr::LOCALHOST, &config)
            .await;

        assert_eq!(result.mode, ProbeMode::Certificate);
        assert!(!result.healthy);
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
