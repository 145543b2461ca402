/* src/resolver.rs */

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Type alias for header maps. Lower-cased keys are recommended; lookups fall
/// back to a case-insensitive scan.
pub type HeaderMap = HashMap<String, String>;

/// Best-guess client address for one request.
///
/// Kept as an opaque string: whatever the winning header carried is passed on
/// unchanged, malformed or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientAddress(String);

impl ClientAddress {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Address used when neither headers nor the connection yielded anything.
    pub fn unknown() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the raw value as an IP address, if it is one.
    pub fn parse_ip(&self) -> Option<IpAddr> {
        self.0.trim().parse().ok()
    }
}

impl fmt::Display for ClientAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClientAddress {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ClientAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Configuration for client address resolution.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    /// Headers to check, in order of preference.
    pub headers: Vec<String>,
    /// Whether to cut a multi-hop `X-Forwarded-For` list down to its first hop.
    pub split_forwarded: bool,
}

impl Default for AddressResolver {
    fn default() -> Self {
        Self {
            headers: vec!["client-ip".to_string(), "x-forwarded-for".to_string()],
            split_forwarded: false,
        }
    }
}

impl AddressResolver {
    /// Create a resolver with the default `Client-IP`, `X-Forwarded-For` order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headers to check, in order of preference.
    pub fn with_headers(mut self, headers: Vec<String>) -> Self {
        self.headers = headers;
        self
    }

    /// Set whether comma-separated header values are cut to their first hop.
    pub fn split_forwarded(mut self, split: bool) -> Self {
        self.split_forwarded = split;
        self
    }

    /// Resolve the client address from headers, falling back to the
    /// connection's remote address, then to an unknown address.
    pub fn resolve(&self, headers: &HeaderMap, remote_addr: Option<&str>) -> ClientAddress {
        if let Some(value) = self.resolve_from_headers(headers) {
            return ClientAddress::new(value);
        }

        match remote_addr {
            Some(addr) if !addr.is_empty() => ClientAddress::new(addr),
            _ => ClientAddress::unknown(),
        }
    }

    fn resolve_from_headers(&self, headers: &HeaderMap) -> Option<String> {
        for header_name in &self.headers {
            let Some(value) = header_value(headers, header_name) else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            if self.split_forwarded {
                if let Some(first) = value.split(',').map(str::trim).find(|hop| !hop.is_empty()) {
                    return Some(first.to_string());
                }
                continue;
            }
            return Some(value.to_string());
        }
        None
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let lowered = name.to_lowercase();
    if let Some(value) = headers.get(&lowered) {
        return Some(value.as_str());
    }
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Resolve the client address with the default header order.
///
/// # Examples
///
/// ```rust
/// use regional::{resolve_client_address, HeaderMap};
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for".to_string(), "2.16.0.1".to_string());
///
/// let address = resolve_client_address(&headers, Some("127.0.0.1"));
/// assert_eq!(address.as_str(), "2.16.0.1");
/// ```
pub fn resolve_client_address(headers: &HeaderMap, remote_addr: Option<&str>) -> ClientAddress {
    AddressResolver::default().resolve(headers, remote_addr)
}
