//! Remote origin checks run before any byte is fetched
//!
//! Rejects private/internal addresses (including hostnames that resolve to them) and
//! enforces an optional host allowlist.

use crate::traits::{StorageError, StorageResult};
use reqwest::Url;
use std::net::{IpAddr, Ipv6Addr};
use tokio::net::lookup_host;

/// Settings for [`check_url`]
#[derive(Clone, Debug, Default)]
pub struct UrlPolicy {
    pub allow_private_ips: bool,
    pub allowlist: Option<Vec<String>>,
}

/// Parse `url` and check it against `policy`.
///
/// Only `http` and `https` are accepted. DNS failures are logged and let through; the
/// fetch itself will fail if the host really does not resolve.
pub async fn check_url(url: &str, policy: &UrlPolicy) -> StorageResult<Url> {
    let parsed = Url::parse(url).map_err(|e| StorageError::InvalidUrl(format!("{}: {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(StorageError::InvalidUrl(format!(
            "Only HTTP and HTTPS URLs are allowed, got '{}'",
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| StorageError::InvalidUrl("URL must have a host".to_string()))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let host_lower = host.to_lowercase();

    if let Some(allowed_domains) = &policy.allowlist {
        let is_allowed = allowed_domains.iter().any(|allowed| {
            let allowed_lower = allowed.to_lowercase();
            host_lower == allowed_lower || host_lower.ends_with(&format!(".{}", allowed_lower))
        });

        if !is_allowed {
            return Err(StorageError::InvalidUrl(format!(
                "Host '{}' is not in the allowed list: {}",
                host,
                allowed_domains.join(", ")
            )));
        }
    }

    if policy.allow_private_ips {
        return Ok(parsed);
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(StorageError::InvalidUrl(
                "Private/internal IP addresses are not allowed".to_string(),
            ));
        }
    }

    if host_lower == "localhost"
        || host_lower.ends_with(".local")
        || host_lower.ends_with(".localhost")
        || host_lower.contains(".internal")
        || host_lower.contains(".corp")
    {
        return Err(StorageError::InvalidUrl(
            "Localhost and internal hostnames are not allowed".to_string(),
        ));
    }

    let port = parsed.port_or_known_default().unwrap_or(80);
    match lookup_host((host, port)).await {
        Ok(addrs) => {
            for addr in addrs {
                if is_private_ip(&addr.ip()) {
                    return Err(StorageError::InvalidUrl(format!(
                        "Hostname resolves to private/internal IP address: {}",
                        addr.ip()
                    )));
                }
            }
        }
        Err(e) => {
            tracing::warn!(host = %host, error = %e, "Failed to resolve hostname for URL check");
        }
    }

    Ok(parsed)
}

/// Check if an IP address is private/internal
///
/// Returns true for:
/// - IPv4 private ranges: 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
/// - IPv4 localhost: 127.0.0.0/8
/// - IPv4 link-local: 169.254.0.0/16
/// - IPv4 multicast: 224.0.0.0/4
/// - IPv4 reserved: 0.0.0.0/8
/// - IPv6 loopback, unspecified, multicast, link-local (fe80::/10), unique local (fc00::/7)
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            let octets = ipv4.octets();
            octets[0] == 10
                || (octets[0] == 172 && (16..=31).contains(&octets[1]))
                || (octets[0] == 192 && octets[1] == 168)
                || octets[0] == 127
                || (octets[0] == 169 && octets[1] == 254)
                || (224..=239).contains(&octets[0])
                || octets[0] == 0
        }
        IpAddr::V6(ipv6) => {
            ipv6.is_loopback()
                || ipv6.is_unspecified()
                || ipv6.is_multicast()
                || is_ipv6_link_local(ipv6)
                || is_ipv6_unique_local(ipv6)
        }
    }
}

fn is_ipv6_link_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xffc0 == 0xfe80
}

fn is_ipv6_unique_local(ip: &Ipv6Addr) -> bool {
    ip.segments()[0] & 0xfe00 == 0xfc00
}
