use std::time::Duration;

use chrono::{DateTime, Utc};

/// Per-operation timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Certificate warning window used when none is configured.
pub const DEFAULT_CERT_WARN_DAYS: u32 = 90;

pub const DEFAULT_HTTP_PORT: u16 = 80;
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Which checks a probe performs against each address.
///
/// Built once and then only read. Every spawned probe gets its own clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    use_tls: bool,
    require_redirect_to_tls: bool,
    check_cert_expiry: bool,
    cert_warn_days: u32,
    timeout: Duration,
    http_port: u16,
    https_port: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeConfig {
    /// Plain HTTP reachability with a 2 second timeout.
    pub fn new() -> Self {
        Self {
            use_tls: false,
            require_redirect_to_tls: false,
            check_cert_expiry: false,
            cert_warn_days: DEFAULT_CERT_WARN_DAYS,
            timeout: DEFAULT_TIMEOUT,
            http_port: DEFAULT_HTTP_PORT,
            https_port: DEFAULT_HTTPS_PORT,
        }
    }

    /// Probe over HTTPS instead of HTTP.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }

    /// Require plain HTTP requests to redirect to an `https` URL.
    pub fn with_redirect_to_tls(mut self, required: bool) -> Self {
        self.require_redirect_to_tls = required;
        self
    }

    /// Switch to certificate-expiry mode.
    pub fn with_cert_expiry_check(mut self, enabled: bool) -> Self {
        self.check_cert_expiry = enabled;
        self
    }

    pub fn with_cert_warn_days(mut self, days: u32) -> Self {
        self.cert_warn_days = days;
        self
    }

    /// Bound for each network operation: connect, full HTTP exchange, TLS handshake.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    pub fn with_https_port(mut self, port: u16) -> Self {
        self.https_port = port;
        self
    }

    pub fn use_tls(&self) -> bool {
        self.use_tls
    }

    pub fn require_redirect_to_tls(&self) -> bool {
        self.require_redirect_to_tls
    }

    pub fn check_cert_expiry(&self) -> bool {
        self.check_cert_expiry
    }

    pub fn cert_warn_days(&self) -> u32 {
        self.cert_warn_days
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    pub fn https_port(&self) -> u16 {
        self.https_port
    }

    /// Certificates expiring at or before this instant fail the check.
    pub fn cert_warn_deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(chrono::Duration::days(i64::from(self.cert_warn_days)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
