use crate::config::HttpConfig;
use crate::error::CoreResult;
use crate::tagged::{ErrorCategory, ResultExt, TaggedError};
use reqwest::blocking::Client;
use serde::Serialize;
use std::fs::File;
use std::net::{IpAddr, Ipv4Addr, TcpListener, TcpStream, ToSocketAddrs, UdpSocket};
use std::path::Path;
use std::time::Duration;
use url::Url;

mod tls;

pub use tls::{ssl_expiry, ssl_expiry_on};

/// One network interface and the addresses bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInterface {
    pub name: String,
    pub addresses: Vec<IpAddr>,
    /// Hardware address as `aa:bb:cc:dd:ee:ff`, when the platform reports one.
    pub mac: Option<String>,
    pub is_loopback: bool,
}

/// Parse `raw` as an absolute http(s) URL.
pub fn parse_url(raw: &str) -> CoreResult<Url> {
    let url = Url::parse(raw).tag(ErrorCategory::Validation, format!("invalid url {:?}", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TaggedError::validation(format!(
            "unsupported url scheme {:?} in {}",
            other, url
        ))
        .into()),
    }
}

pub fn http_client(cfg: &HttpConfig) -> CoreResult<Client> {
    let mut builder = Client::builder()
        .timeout(cfg.timeout())
        .user_agent(cfg.user_agent.as_str());
    if !cfg.use_system_proxy {
        builder = builder.no_proxy();
    }
    Ok(builder
        .build()
        .tag(ErrorCategory::Network, "failed to build http client")?)
}

pub fn simple_get_request(url: &str) -> CoreResult<(u16, String)> {
    simple_get_request_with(url, &HttpConfig::default())
}

/// GET `url` and return the status code and body. Non-2xx statuses are
/// returned, not treated as errors.
pub fn simple_get_request_with(url: &str, cfg: &HttpConfig) -> CoreResult<(u16, String)> {
    let url = parse_url(url)?;
    let resp = http_client(cfg)?
        .get(url.clone())
        .send()
        .tag(ErrorCategory::Network, format!("GET {} failed", url))?;
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .tag(ErrorCategory::Network, format!("reading body of {} failed", url))?;
    tracing::debug!(url = %url, status, bytes = body.len(), "http get");
    Ok((status, body))
}

pub fn download_file(path: impl AsRef<Path>, url: &str) -> CoreResult<u64> {
    download_file_with(path, url, &HttpConfig::default())
}

/// Stream the body of `url` into a new file at `path`, returning the number
/// of bytes written. Non-2xx responses are `Network` errors and leave no file.
pub fn download_file_with(path: impl AsRef<Path>, url: &str, cfg: &HttpConfig) -> CoreResult<u64> {
    let path = path.as_ref();
    let url = parse_url(url)?;
    let mut resp = http_client(cfg)?
        .get(url.clone())
        .send()
        .and_then(|r| r.error_for_status())
        .tag(ErrorCategory::Network, format!("GET {} failed", url))?;
    let mut out = File::create(path)?;
    let written = resp
        .copy_to(&mut out)
        .tag(ErrorCategory::Network, format!("download of {} interrupted", url))?;
    tracing::debug!(url = %url, path = %path.display(), bytes = written, "downloaded file");
    Ok(written)
}

/// Ask the configured echo service for this host's public address.
pub fn public_ip(cfg: &HttpConfig) -> CoreResult<IpAddr> {
    let url = parse_url(&cfg.public_ip_url)?;
    let body = http_client(cfg)?
        .get(url.clone())
        .send()
        .and_then(|r| r.error_for_status())
        .and_then(|r| r.text())
        .tag(ErrorCategory::Network, format!("GET {} failed", url))?;
    Ok(body
        .trim()
        .parse::<IpAddr>()
        .tag(ErrorCategory::Network, format!("{} did not answer with an ip address", url))?)
}

/// Whether a TCP connection to `addr` (`host:port`) succeeds within `timeout`.
pub fn check_host_availability(addr: &str, timeout: Duration) -> bool {
    let targets = match addr.to_socket_addrs() {
        Ok(targets) => targets,
        Err(err) => {
            tracing::debug!(addr, error = %err, "cannot resolve host");
            return false;
        }
    };
    for target in targets {
        match TcpStream::connect_timeout(&target, timeout) {
            Ok(_) => return true,
            Err(err) => tracing::debug!(target = %target, error = %err, "connect failed"),
        }
    }
    false
}

pub fn is_port_open(host: &str, port: u16, timeout: Duration) -> bool {
    check_host_availability(&format!("{}:{}", host, port), timeout)
}

/// Bind a listener on every interface. Port 0 picks a free port.
pub fn listen_on_port(port: u16) -> CoreResult<TcpListener> {
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .tag(ErrorCategory::Network, format!("cannot listen on port {}", port))?;
    tracing::debug!(addr = ?listener.local_addr().ok(), "listening");
    Ok(listener)
}

/// First IPv4 address of `host`.
pub fn resolve_hostname(host: &str) -> CoreResult<Ipv4Addr> {
    let addrs = (host, 0)
        .to_socket_addrs()
        .tag(ErrorCategory::Network, format!("cannot resolve {}", host))?;
    addrs
        .filter_map(|a| match a.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| TaggedError::not_found(format!("no IPv4 address found for {}", host)).into())
}

/// First non-loopback IPv4 address of this host.
///
/// Interface addresses are checked first; if none qualifies the address the
/// kernel would route outbound traffic from is used. The probe only connects
/// a UDP socket, nothing is sent.
pub fn local_ip() -> CoreResult<Ipv4Addr> {
    let from_interfaces = network_interfaces()?
        .into_iter()
        .filter(|iface| !iface.is_loopback)
        .flat_map(|iface| iface.addresses)
        .find_map(|addr| match addr {
            IpAddr::V4(v4) if !v4.is_loopback() => Some(v4),
            _ => None,
        });
    if let Some(ip) = from_interfaces {
        return Ok(ip);
    }
    match outbound_ipv4() {
        Some(ip) => Ok(ip),
        None => Err(TaggedError::not_found("no non-loopback IPv4 address").into()),
    }
}

fn outbound_ipv4() -> Option<Ipv4Addr> {
    let sock = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    sock.connect((Ipv4Addr::new(8, 8, 8, 8), 80)).ok()?;
    match sock.local_addr().ok()?.ip() {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
        _ => None,
    }
}

/// Hardware address of the first non-loopback interface that has one.
pub fn mac_address() -> CoreResult<String> {
    network_interfaces()?
        .into_iter()
        .filter(|iface| !iface.is_loopback)
        .find_map(|iface| iface.mac)
        .ok_or_else(|| TaggedError::not_found("no interface reports a hardware address").into())
}

#[cfg(unix)]
pub fn network_interfaces() -> CoreResult<Vec<NetworkInterface>> {
    use nix::ifaddrs::getifaddrs;
    use nix::net::if_::InterfaceFlags;
    use std::net::{SocketAddrV4, SocketAddrV6};

    let addrs = getifaddrs().tag(ErrorCategory::Io, "getifaddrs failed")?;
    let mut out: Vec<NetworkInterface> = Vec::new();
    for ifa in addrs {
        let idx = match out.iter().position(|i| i.name == ifa.interface_name) {
            Some(idx) => idx,
            None => {
                out.push(NetworkInterface {
                    name: ifa.interface_name.clone(),
                    addresses: Vec::new(),
                    mac: None,
                    is_loopback: ifa.flags.contains(InterfaceFlags::IFF_LOOPBACK),
                });
                out.len() - 1
            }
        };
        let Some(storage) = ifa.address else {
            continue;
        };
        let iface = &mut out[idx];
        if let Some(sin) = storage.as_sockaddr_in() {
            iface.addresses.push(IpAddr::V4(*SocketAddrV4::from(*sin).ip()));
        } else if let Some(sin6) = storage.as_sockaddr_in6() {
            iface.addresses.push(IpAddr::V6(*SocketAddrV6::from(*sin6).ip()));
        } else if iface.mac.is_none() {
            iface.mac = link_mac(&storage);
        }
    }
    Ok(out)
}

#[cfg(not(unix))]
pub fn network_interfaces() -> CoreResult<Vec<NetworkInterface>> {
    Ok(Vec::new())
}

#[cfg(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
))]
fn link_mac(storage: &nix::sys::socket::SockaddrStorage) -> Option<String> {
    let bytes = storage.as_link_addr()?.addr()?;
    if bytes.iter().all(|b| *b == 0) {
        return None;
    }
    Some(format_mac(&bytes))
}

#[cfg(all(
    unix,
    not(any(
        target_os = "linux",
        target_os = "android",
        target_os = "macos",
        target_os = "ios",
        target_os = "freebsd"
    ))
))]
fn link_mac(_storage: &nix::sys::socket::SockaddrStorage) -> Option<String> {
    None
}

fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(unix)]
pub fn hostname() -> CoreResult<String> {
    let name = nix::unistd::gethostname().tag(ErrorCategory::Io, "gethostname failed")?;
    Ok(name.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
pub fn hostname() -> CoreResult<String> {
    std::env::var("COMPUTERNAME")
        .map_err(|_| TaggedError::not_found("COMPUTERNAME is not set").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_is_colon_separated_lowercase_hex() {
        assert_eq!(format_mac(&[0x00, 0x1A, 0x2b, 0x3c, 0x4d, 0xff]), "00:1a:2b:3c:4d:ff");
    }

    #[test]
    fn only_http_urls_are_accepted() {
        assert!(parse_url("https://example.com/x").is_ok());
        let err = parse_url("ftp://example.com/x").unwrap_err();
        assert_eq!(err.category(), Some(ErrorCategory::Validation));
        let err = parse_url("not a url").unwrap_err();
        assert_eq!(err.category(), Some(ErrorCategory::Validation));
    }
}
