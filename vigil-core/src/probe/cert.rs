use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::debug;
use x509_parser::prelude::{FromDer, X509Certificate};

use super::config::ProbeConfig;
use super::types::{ProbeMode, ProbeResult};
use crate::error::{Result, VigilError};

/// Accepts whatever chain the server presents.
///
/// The expiry check inspects certificates, it does not judge trust. Handshake
/// signatures are still verified so the peer must hold the leaf's key.
#[derive(Debug)]
struct AcceptAnyCertificate {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

fn inspecting_connector() -> Result<TlsConnector> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let config = rustls::ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate { provider }))
        .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Complete a TLS handshake with `addr` and return the presented chain, leaf first.
///
/// Connect and handshake are each bounded by `limit`. The connection is closed
/// before returning, on success and on every error path.
pub async fn fetch_peer_chain(
    addr: SocketAddr,
    limit: Duration,
) -> Result<Vec<CertificateDer<'static>>> {
    let connector = inspecting_connector()?;

    let stream = timeout(limit, TcpStream::connect(addr))
        .await
        .map_err(|_| VigilError::Timeout(format!("connection to {} timed out", addr)))?
        .map_err(|e| VigilError::Other(e.to_string()))?;

    let server_name = ServerName::from(addr.ip());
    let mut tls_stream = timeout(limit, connector.connect(server_name, stream))
        .await
        .map_err(|_| VigilError::Timeout(format!("TLS handshake with {} timed out", addr)))?
        .map_err(|e| VigilError::Other(e.to_string()))?;

    let chain = tls_stream
        .get_ref()
        .1
        .peer_certificates()
        .map(|certs| certs.to_vec())
        .unwrap_or_default();

    // Best-effort close_notify; the socket is dropped either way.
    let _ = timeout(limit, tls_stream.shutdown()).await;

    Ok(chain)
}

/// Return the notAfter of the first certificate in `chain` that expires at or
/// before `deadline`.
///
/// Certificates repeated in the chain are only examined once, keyed by their
/// signature bytes. Examination stops at the first expiring certificate.
pub fn expiring_certificate(
    chain: &[CertificateDer<'_>],
    deadline: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    let mut seen: HashSet<Vec<u8>> = HashSet::new();

    for der in chain {
        let (_, cert) = X509Certificate::from_der(der.as_ref())
            .map_err(|e| VigilError::CertificateError(e.to_string()))?;

        if !seen.insert(cert.signature_value.data.to_vec()) {
            continue;
        }

        let not_after = DateTime::<Utc>::from_timestamp(cert.validity().not_after.timestamp(), 0)
            .ok_or_else(|| {
                VigilError::CertificateError("notAfter is out of range".to_string())
            })?;

        if deadline >= not_after {
            return Ok(Some(not_after));
        }
    }

    Ok(None)
}

/// Certificate-expiry probe against `address` on the configured HTTPS port.
pub async fn probe_certificate(address: Ipv4Addr, config: &ProbeConfig) -> ProbeResult {
    let mode = ProbeMode::Certificate;
    let addr = SocketAddr::new(IpAddr::V4(address), config.https_port());

    let chain = match fetch_peer_chain(addr, config.timeout()).await {
        Ok(chain) => chain,
        Err(e) => {
            return ProbeResult::unhealthy(address, mode, format!("connection failed: {}", e));
        }
    };

    if chain.is_empty() {
        return ProbeResult::unhealthy(address, mode, "no certificate presented");
    }

    debug!(certificates = chain.len(), "Inspecting presented chain");

    let deadline = config.cert_warn_deadline(Utc::now());
    match expiring_certificate(&chain, deadline) {
        Ok(None) => ProbeResult::healthy(address, mode),
        Ok(Some(not_after)) => ProbeResult::unhealthy(
            address,
            mode,
            format!(
                "certificate expires within warning window (not after {})",
                not_after.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        ),
        Err(e) => ProbeResult::unhealthy(address, mode, format!("unparseable certificate: {}", e)),
    }
}
