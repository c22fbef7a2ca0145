//! Host name and resolver address validation

use std::net::{IpAddr, SocketAddr};

use crate::error::{Result, VigilError};

/// Port DNS servers are queried on.
pub const DNS_PORT: u16 = 53;

/// Normalize and validate a host name before it is sent to a resolver
///
/// This function:
/// - Trims whitespace and converts to lowercase
/// - Removes a single trailing dot (fully-qualified form)
/// - Accepts single-label names such as `localhost`
/// - Validates each label: 1-63 chars, alphanumeric or hyphen, no leading or trailing hyphen
///
/// Unlike URL-oriented helpers it never strips schemes or `www.`; the probe
/// targets exactly the name it is given.
pub fn normalize_host(host: &str) -> Result<String> {
    let host = host.trim().to_lowercase();
    let host = host.strip_suffix('.').unwrap_or(&host);

    if host.is_empty() || host.len() > 253 {
        return Err(VigilError::InvalidHost(host.to_string()));
    }

    for label in host.split('.') {
        if label.is_empty()
            || label.len() > 63
            || label.starts_with('-')
            || label.ends_with('-')
            || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(VigilError::InvalidHost(host.to_string()));
        }
    }

    Ok(host.to_string())
}

/// Parse a DNS server argument into a socket address
///
/// Accepts a bare IP (`8.8.8.8`, queried on port 53), a leading `@` as in
/// `dig @8.8.8.8`, or an explicit `ip:port` pair.
pub fn parse_dns_server(server: &str) -> Result<SocketAddr> {
    let server = server.trim().trim_start_matches('@');

    if let Ok(ip) = server.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }

    server
        .parse::<SocketAddr>()
        .map_err(|_| VigilError::InvalidDnsServer(server.to_string()))
}
