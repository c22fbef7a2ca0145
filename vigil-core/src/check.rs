use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::dns::AddressResolver;
use crate::error::{Result, VigilError};
use crate::fanout::FanOutCoordinator;
use crate::probe::{Probe, ProbeConfig, ProbeExecutor, ProbeMode, ProbeResult};
use crate::validation::normalize_host;
use crate::verdict::{aggregate, Verdict};

/// Everything one run found out about a host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckReport {
    pub host: String,
    pub mode: ProbeMode,
    pub addresses: Vec<Ipv4Addr>,
    /// Per-address results in completion order
    pub results: Vec<ProbeResult>,
    pub verdict: Verdict,
    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    pub fn is_healthy(&self) -> bool {
        self.verdict.is_healthy()
    }
}

/// Resolve a host, probe every address, and aggregate.
#[derive(Debug, Clone)]
pub struct HealthCheck<R, P = ProbeExecutor> {
    resolver: R,
    coordinator: FanOutCoordinator<P>,
    config: ProbeConfig,
}

impl<R: AddressResolver> HealthCheck<R> {
    pub fn new(resolver: R, config: ProbeConfig) -> Self {
        Self {
            resolver,
            coordinator: FanOutCoordinator::new(),
            config,
        }
    }
}

impl<R: AddressResolver, P: Probe + 'static> HealthCheck<R, P> {
    /// Use a custom probe in place of the network [`ProbeExecutor`].
    pub fn with_probe(resolver: R, probe: P, config: ProbeConfig) -> Self {
        Self {
            resolver,
            coordinator: FanOutCoordinator::with_probe(probe),
            config,
        }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run the check. Fails only when the host is invalid or resolves to
    /// nothing; per-address problems land in the report.
    #[instrument(skip(self))]
    pub async fn run(&self, host: &str) -> Result<CheckReport> {
        let host = normalize_host(host)?;
        let addresses = self.resolver.resolve_a(&host).await?;

        if addresses.is_empty() {
            return Err(VigilError::NoAddresses(host));
        }

        let results = self.coordinator.run(&addresses, &self.config).await;
        let verdict = aggregate(&results);

        info!(
            total = verdict.total,
            failed = verdict.failed_count,
            "Health check complete"
        );

        Ok(CheckReport {
            host,
            mode: ProbeMode::for_config(&self.config),
            addresses,
            results,
            verdict,
            checked_at: Utc::now(),
        })
    }
}
