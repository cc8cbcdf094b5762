use rcgen::{CertificateParams, KeyPair};
use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ServerConfig, ServerConnection};
use std::io::Write;
use std::net::{Ipv4Addr, TcpListener};
use std::sync::Arc;
use std::thread;
use time::macros::datetime;
use time::OffsetDateTime;
use utilkit_core::config::HttpConfig;
use utilkit_core::net::ssl_expiry_on;
use utilkit_core::ErrorCategory;

fn local_http() -> HttpConfig {
    HttpConfig {
        timeout_secs: 5,
        ..HttpConfig::default()
    }
}

/// Accept one TLS handshake on a loopback port with a fresh self-signed
/// certificate that expires at `not_after`.
fn serve_tls_once(not_after: OffsetDateTime) -> u16 {
    let mut params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    params.not_after = not_after;
    let key = KeyPair::generate().unwrap();
    let cert = params.self_signed(&key).unwrap();
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der()));

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key_der)
        .unwrap();

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let (mut sock, _) = listener.accept().unwrap();
        let mut conn = ServerConnection::new(Arc::new(config)).unwrap();
        while conn.is_handshaking() {
            if conn.complete_io(&mut sock).is_err() {
                return;
            }
        }
    });
    port
}

#[test]
fn reads_not_after_from_a_self_signed_certificate() {
    let port = serve_tls_once(datetime!(2031-05-17 0:00 UTC));
    let expiry = ssl_expiry_on("127.0.0.1", port, &local_http()).unwrap();
    assert_eq!(expiry, datetime!(2031-05-17 0:00 UTC));
}

#[test]
fn expired_certificates_are_still_read() {
    let port = serve_tls_once(datetime!(2001-01-01 12:30 UTC));
    let expiry = ssl_expiry_on("localhost", port, &local_http()).unwrap();
    assert_eq!(expiry, datetime!(2001-01-01 12:30 UTC));
}

#[test]
fn closed_port_is_a_network_error() {
    let port = {
        let l = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        l.local_addr().unwrap().port()
    };
    let err = ssl_expiry_on("127.0.0.1", port, &local_http()).unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Network));
}

#[test]
fn plaintext_peer_fails_the_handshake_as_network_error() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let (mut sock, _) = listener.accept().unwrap();
        let _ = sock.write_all(b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n");
    });
    let err = ssl_expiry_on("127.0.0.1", port, &local_http()).unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Network));
}
