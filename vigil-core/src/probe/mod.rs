mod cert;
mod config;
mod executor;
mod http;
mod types;

pub use cert::{expiring_certificate, fetch_peer_chain, probe_certificate};
pub use config::{
    ProbeConfig, DEFAULT_CERT_WARN_DAYS, DEFAULT_HTTPS_PORT, DEFAULT_HTTP_PORT, DEFAULT_TIMEOUT,
};
pub use executor::{Probe, ProbeExecutor};
pub use http::{probe_reachability, probe_url, redirect_policy};
pub use types::{ProbeMode, ProbeResult};
