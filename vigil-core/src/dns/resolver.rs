use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, instrument};

use crate::error::{Result, VigilError};
use crate::validation::normalize_host;

/// Default timeout for a single DNS query attempt (2 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Default number of query attempts against the configured server.
const DEFAULT_ATTEMPTS: usize = 4;

/// Anything that can turn a host name into the set of IPv4 addresses to probe.
///
/// An implementation must return an error rather than an empty list when the
/// name has no A records.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve_a(&self, host: &str) -> Result<Vec<Ipv4Addr>>;
}

/// A-record resolver bound to one DNS server.
#[derive(Debug, Clone)]
pub struct DnsResolver {
    server: SocketAddr,
    timeout: Duration,
    attempts: usize,
}

impl DnsResolver {
    /// Creates a resolver that queries `server` over UDP.
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            timeout: DEFAULT_TIMEOUT,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Sets the timeout for each query attempt.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how many times a query is attempted before giving up.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    fn create_resolver(&self) -> TokioAsyncResolver {
        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = self.attempts;
        opts.use_hosts_file = false;

        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig::new(self.server, Protocol::Udp));

        TokioAsyncResolver::tokio(config, opts)
    }
}

#[async_trait]
impl AddressResolver for DnsResolver {
    #[instrument(skip(self), fields(server = %self.server))]
    async fn resolve_a(&self, host: &str) -> Result<Vec<Ipv4Addr>> {
        let host = normalize_host(host)?;
        let resolver = self.create_resolver();

        debug!("Resolving A records");

        let response = resolver
            .ipv4_lookup(host.as_str())
            .await
            .map_err(|e| VigilError::DnsError(format!("A lookup for {} failed: {}", host, e)))?;

        let addresses: Vec<Ipv4Addr> = response.iter().map(|a| a.0).collect();

        if addresses.is_empty() {
            return Err(VigilError::NoAddresses(host));
        }

        debug!(count = addresses.len(), "Resolved A records");
        Ok(addresses)
    }
}
