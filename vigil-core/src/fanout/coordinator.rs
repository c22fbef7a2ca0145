use std::net::Ipv4Addr;
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error};

use crate::probe::{Probe, ProbeConfig, ProbeExecutor, ProbeMode, ProbeResult};

/// Probes every address at once and gathers the results.
///
/// Each address gets its own spawned task holding its own copy of the address
/// and configuration. Results come back through the tasks' join handles and
/// are appended by the coordinator alone, in completion order.
#[derive(Debug, Clone)]
pub struct FanOutCoordinator<P = ProbeExecutor> {
    probe: Arc<P>,
}

impl Default for FanOutCoordinator<ProbeExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl FanOutCoordinator<ProbeExecutor> {
    pub fn new() -> Self {
        Self::with_probe(ProbeExecutor::new())
    }
}

impl<P: Probe + 'static> FanOutCoordinator<P> {
    pub fn with_probe(probe: P) -> Self {
        Self {
            probe: Arc::new(probe),
        }
    }

    /// Run one probe per address and wait for all of them.
    ///
    /// There is no early exit: a failing address never cancels its siblings.
    pub async fn run(&self, addresses: &[Ipv4Addr], config: &ProbeConfig) -> Vec<ProbeResult> {
        let total = addresses.len();
        let mode = ProbeMode::for_config(config);

        debug!(total = total, mode = %mode, "Starting fan-out");

        let mut pending: FuturesUnordered<_> = addresses
            .iter()
            .copied()
            .map(|address| {
                let probe = Arc::clone(&self.probe);
                let config = config.clone();
                let handle = tokio::spawn(async move { probe.probe(address, &config).await });

                async move {
                    match handle.await {
                        Ok(result) => result,
                        Err(e) => {
                            error!(address = %address, error = %e, "Probe task failed");
                            ProbeResult::unhealthy(address, mode, format!("probe task failed: {}", e))
                        }
                    }
                }
            })
            .collect();

        let mut results = Vec::with_capacity(total);
        while let Some(result) = pending.next().await {
            results.push(result);
            debug!(completed = results.len(), total = total, "Probe finished");
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verdict::aggregate;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::time::{Duration, Instant};

    /// Fails every address whose last octet is a multiple of `every`, after a
    /// delay that varies per address so completion order is shuffled.
    struct StubProbe {
        every: u8,
    }

    #[async_trait]
    impl Probe for StubProbe {
        async fn probe(&self, address: Ipv4Addr, config: &ProbeConfig) -> ProbeResult {
            let octets = address.octets();
            tokio::time::sleep(Duration::from_millis(u64::from(octets[3] % 13))).await;

            let mode = ProbeMode::for_config(config);
            if octets[3] % self.every == 0 {
                ProbeResult::unhealthy(address, mode, "stub failure")
            } else {
                ProbeResult::healthy(address, mode)
            }
        }
    }

    struct SleepyProbe(Duration);

    #[async_trait]
    impl Probe for SleepyProbe {
        async fn probe(&self, address: Ipv4Addr, config: &ProbeConfig) -> ProbeResult {
            tokio::time::sleep(self.0).await;
            ProbeResult::healthy(address, ProbeMode::for_config(config))
        }
    }

    struct PanickyProbe;

    #[async_trait]
    impl Probe for PanickyProbe {
        async fn probe(&self, address: Ipv4Addr, config: &ProbeConfig) -> ProbeResult {
            if address.octets()[3] == 13 {
                panic!("unlucky address");
            }
            ProbeResult::healthy(address, ProbeMode::for_config(config))
        }
    }

    fn addresses(count: usize) -> Vec<Ipv4Addr> {
        (0..count)
            .map(|i| Ipv4Addr::new(10, (i / 65536) as u8, ((i / 256) % 256) as u8, (i % 256) as u8))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_address_list() {
        let coordinator = FanOutCoordinator::with_probe(StubProbe { every: 2 });
        let results = coordinator.run(&[], &ProbeConfig::new()).await;
        assert!(results.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stress_no_lost_or_duplicated_results() {
        let addresses = addresses(2000);
        let expected_failures = addresses.iter().filter(|a| a.octets()[3] % 7 == 0).count();
        let coordinator = FanOutCoordinator::with_probe(StubProbe { every: 7 });

        for _ in 0..5 {
            let results = coordinator.run(&addresses, &ProbeConfig::new()).await;
            assert_eq!(results.len(), addresses.len());

            let unique: HashSet<Ipv4Addr> = results.iter().map(|r| r.address).collect();
            assert_eq!(unique.len(), addresses.len());

            let verdict = aggregate(&results);
            assert_eq!(verdict.total, addresses.len());
            assert_eq!(verdict.failed_count, expected_failures);
            assert_eq!(verdict.failed_addresses.len(), verdict.failed_count);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_probes_run_concurrently() {
        let addresses = addresses(50);
        let coordinator = FanOutCoordinator::with_probe(SleepyProbe(Duration::from_millis(200)));

        let start = Instant::now();
        let results = coordinator.run(&addresses, &ProbeConfig::new()).await;

        assert_eq!(results.len(), 50);
        assert!(results.iter().all(|r| r.healthy));
        // Sequential execution would take 10 seconds
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_panicking_probe_is_reported_not_lost() {
        let addresses = addresses(20);
        let coordinator = FanOutCoordinator::with_probe(PanickyProbe);

        let results = coordinator.run(&addresses, &ProbeConfig::new()).await;
        assert_eq!(results.len(), 20);

        let failed: Vec<_> = results.iter().filter(|r| !r.healthy).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].address, Ipv4Addr::new(10, 0, 0, 13));
        assert!(failed[0]
            .reason
            .as_deref()
            .unwrap()
            .starts_with("probe task failed"));
    }

    #[tokio::test]
    async fn test_results_carry_configured_mode() {
        let coordinator = FanOutCoordinator::with_probe(StubProbe { every: 255 });
        let config = ProbeConfig::new().with_tls(true);

        let results = coordinator.run(&addresses(3), &config).await;
        assert!(results.iter().all(|r| r.mode == ProbeMode::Https));
    }
}
