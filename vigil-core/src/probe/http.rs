use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use reqwest::redirect::Policy;
use tracing::debug;

use super::config::{ProbeConfig, DEFAULT_HTTPS_PORT, DEFAULT_HTTP_PORT};
use super::types::{ProbeMode, ProbeResult};
use crate::error::{Result, VigilError};

const USER_AGENT: &str = concat!("vigil/", env!("CARGO_PKG_VERSION"));

/// Build the URL a reachability probe requests for `address`.
///
/// Default ports are left out so the request line and Host header match
/// `http://address/`.
pub fn probe_url(address: Ipv4Addr, config: &ProbeConfig) -> String {
    let (scheme, port, default_port) = if config.use_tls() {
        ("https", config.https_port(), DEFAULT_HTTPS_PORT)
    } else {
        ("http", config.http_port(), DEFAULT_HTTP_PORT)
    };

    if port == default_port {
        format!("{}://{}/", scheme, address)
    } else {
        format!("{}://{}:{}/", scheme, address, port)
    }
}

/// Redirect interception policy.
///
/// Never follows a redirect: the first hop is recorded in `observed` and the
/// redirect response is returned as-is. With `require_tls` set, a hop whose
/// target scheme is not `https` fails the request instead.
pub fn redirect_policy(require_tls: bool, observed: Arc<AtomicBool>) -> Policy {
    Policy::custom(move |attempt| {
        observed.store(true, Ordering::SeqCst);

        if require_tls && attempt.url().scheme() != "https" {
            let host = attempt
                .previous()
                .first()
                .and_then(|url| url.host_str())
                .unwrap_or("unknown host")
                .to_string();
            return attempt.error(format!("there is no HTTP to HTTPS redirect for {}", host));
        }

        attempt.stop()
    })
}

/// Issue a single GET against `address` and judge reachability.
pub async fn probe_reachability(address: Ipv4Addr, config: &ProbeConfig) -> ProbeResult {
    let mode = ProbeMode::for_config(config);
    let redirected = Arc::new(AtomicBool::new(false));

    if let Err(e) = fetch(address, config, redirected.clone()).await {
        return ProbeResult::unhealthy(address, mode, format!("request failed: {}", e));
    }

    if !config.use_tls()
        && config.require_redirect_to_tls()
        && !redirected.load(Ordering::SeqCst)
    {
        return ProbeResult::unhealthy(address, mode, "no redirect to HTTPS observed");
    }

    ProbeResult::healthy(address, mode)
}

async fn fetch(address: Ipv4Addr, config: &ProbeConfig, redirected: Arc<AtomicBool>) -> Result<()> {
    let url = probe_url(address, config);

    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.timeout())
        .redirect(redirect_policy(config.require_redirect_to_tls(), redirected))
        .user_agent(USER_AGENT)
        .build()?;

    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| VigilError::Other(error_chain(&e)))?;

    debug!(url = %url, status = %response.status(), "Probe response");
    Ok(())
}

/// Render an error together with its sources, e.g. the redirect policy's
/// message hidden behind reqwest's "error following redirect".
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
