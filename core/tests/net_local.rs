use std::io::{BufRead, BufReader, Write};
use std::net::{Ipv4Addr, TcpListener};
use std::thread;
use std::time::Duration;
use utilkit_core::config::HttpConfig;
use utilkit_core::json::get_json_from_url_with;
use utilkit_core::net::{
    check_host_availability, download_file_with, is_port_open, listen_on_port, public_ip,
    resolve_hostname, simple_get_request_with,
};
use utilkit_core::ErrorCategory;

fn local_http() -> HttpConfig {
    HttpConfig {
        timeout_secs: 5,
        use_system_proxy: false,
        ..HttpConfig::default()
    }
}

/// Serve one canned HTTP response on a loopback port and return its base URL.
fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                break;
            }
        }
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nContent-Type: application/json\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();
    });
    format!("http://{}", addr)
}

#[test]
fn simple_get_returns_status_and_body() {
    let url = serve_once("200 OK", "hello");
    let (status, body) = simple_get_request_with(&format!("{}/x", url), &local_http()).unwrap();
    assert_eq!(status, 200);
    assert_eq!(body, "hello");
}

#[test]
fn simple_get_passes_error_statuses_through() {
    let url = serve_once("404 Not Found", "nope");
    let (status, body) = simple_get_request_with(&url, &local_http()).unwrap();
    assert_eq!(status, 404);
    assert_eq!(body, "nope");
}

#[test]
fn invalid_urls_are_validation_errors() {
    let err = simple_get_request_with("::not a url::", &local_http()).unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Validation));
}

#[test]
fn connection_refused_is_a_network_error() {
    let port = {
        let l = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        l.local_addr().unwrap().port()
    };
    let err = simple_get_request_with(&format!("http://127.0.0.1:{}/", port), &local_http())
        .unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Network));
}

#[test]
fn download_writes_body_to_disk() {
    let url = serve_once("200 OK", "file contents");
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("download.txt");
    let n = download_file_with(&dest, &url, &local_http()).unwrap();
    assert_eq!(n, 13);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "file contents");
}

#[test]
fn download_fails_on_error_status() {
    let url = serve_once("500 Internal Server Error", "boom");
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("never.txt");
    let err = download_file_with(&dest, &url, &local_http()).unwrap_err();
    assert_eq!(err.category(), Some(ErrorCategory::Network));
    assert!(!dest.exists());
}

#[test]
fn json_is_fetched_and_decoded() {
    let url = serve_once("200 OK", r#"{"name":"utilkit","ok":true}"#);
    let v: serde_json::Value = get_json_from_url_with(&url, &local_http()).unwrap();
    assert_eq!(v["name"], "utilkit");
    assert_eq!(v["ok"], true);
}

#[test]
fn public_ip_reads_the_echo_service() {
    let url = serve_once("200 OK", "203.0.113.7\n");
    let cfg = HttpConfig {
        public_ip_url: url,
        ..local_http()
    };
    assert_eq!(public_ip(&cfg).unwrap().to_string(), "203.0.113.7");
}

#[test]
fn port_probes_see_listening_sockets() {
    let listener = listen_on_port(0).unwrap();
    let port = listener.local_addr().unwrap().port();
    let timeout = Duration::from_secs(2);
    assert!(is_port_open("127.0.0.1", port, timeout));
    assert!(check_host_availability(&format!("127.0.0.1:{}", port), timeout));
    drop(listener);
    assert!(!is_port_open("127.0.0.1", port, timeout));
    assert!(!check_host_availability("no-port-given", timeout));
}

#[test]
fn localhost_resolves_to_loopback() {
    assert_eq!(resolve_hostname("127.0.0.1").unwrap(), Ipv4Addr::LOCALHOST);
}

#[cfg(unix)]
#[test]
fn interfaces_include_loopback() {
    let ifaces = utilkit_core::net::network_interfaces().unwrap();
    assert!(ifaces.iter().any(|i| i.is_loopback));
    assert!(!utilkit_core::net::hostname().unwrap().is_empty());
}
