use crate::config::HttpConfig;
use crate::error::CoreResult;
use crate::tagged::{ErrorCategory, ResultExt, TaggedError};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, SignatureScheme};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;

/// NotAfter of the certificate `domain` presents on port 443.
///
/// Neither the chain nor the host name is verified, so expired and
/// self-signed certificates are still read.
pub fn ssl_expiry(domain: &str, cfg: &HttpConfig) -> CoreResult<OffsetDateTime> {
    ssl_expiry_on(domain, 443, cfg)
}

pub fn ssl_expiry_on(host: &str, port: u16, cfg: &HttpConfig) -> CoreResult<OffsetDateTime> {
    let leaf = leaf_certificate(host, port, cfg.timeout())?;
    let (_, cert) = x509_parser::parse_x509_certificate(leaf.as_ref()).map_err(|e| {
        TaggedError::crypto(format!("bad certificate from {}:{}: {}", host, port, e))
    })?;
    let not_after = cert.validity().not_after.to_datetime();
    tracing::debug!(host, port, %not_after, "read certificate expiry");
    Ok(not_after)
}

fn leaf_certificate(
    host: &str,
    port: u16,
    timeout: Duration,
) -> CoreResult<CertificateDer<'static>> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .tag(ErrorCategory::Crypto, "no usable TLS protocol version")?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
        .with_no_client_auth();
    let name = ServerName::try_from(host.to_string())
        .map_err(|e| TaggedError::validation(format!("invalid server name {:?}: {}", host, e)))?;
    let mut conn = ClientConnection::new(Arc::new(config), name)
        .tag(ErrorCategory::Crypto, "cannot start a TLS session")?;

    let mut sock = connect(host, port, timeout)?;
    while conn.is_handshaking() {
        conn.complete_io(&mut sock).tag(
            ErrorCategory::Network,
            format!("TLS handshake with {}:{} failed", host, port),
        )?;
    }
    let leaf = conn
        .peer_certificates()
        .and_then(|chain| chain.first())
        .cloned()
        .ok_or_else(|| TaggedError::crypto(format!("{}:{} sent no certificate", host, port)))?;

    conn.send_close_notify();
    while conn.wants_write() {
        if conn.write_tls(&mut sock).is_err() {
            break;
        }
    }
    Ok(leaf)
}

fn connect(host: &str, port: u16, timeout: Duration) -> CoreResult<TcpStream> {
    let addrs = (host, port)
        .to_socket_addrs()
        .tag(ErrorCategory::Network, format!("cannot resolve {}", host))?;
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(sock) => {
                sock.set_read_timeout(Some(timeout))?;
                sock.set_write_timeout(Some(timeout))?;
                return Ok(sock);
            }
            Err(err) => last_err = Some(err),
        }
    }
    let msg = format!("cannot connect to {}:{}", host, port);
    Err(match last_err {
        Some(err) => TaggedError::with_cause(ErrorCategory::Network, msg, err),
        None => TaggedError::network(msg),
    }
    .into())
}

// Accepts any chain and name. Handshake signatures are still checked against
// the presented key.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
