use thiserror::Error;

#[derive(Error, Debug)]
pub enum VigilError {
    #[error("Invalid host name: {0}")]
    InvalidHost(String),

    #[error("Invalid DNS server address: {0}")]
    InvalidDnsServer(String),

    #[error("DNS resolution failed: {0}")]
    DnsError(String),

    #[error("No A records found for {0}")]
    NoAddresses(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("TLS error: {0}")]
    TlsError(#[from] rustls::Error),

    #[error("Certificate error: {0}")]
    CertificateError(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, VigilError>;
