/* src/settings.rs */

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::DEFAULT_CAPACITY;
use crate::error::{RegionError, Result};
use crate::lookup::{DEFAULT_ENDPOINT, MAX_RETRIES};
use crate::resolver::AddressResolver;

/// Environment prefix for overrides, e.g. `REGIONAL__TIMEOUT_MS=1500`.
pub const ENV_PREFIX: &str = "REGIONAL";

/// Longest accepted cache lifetime (one day).
pub const MAX_CACHE_TTL_SECS: u64 = 86_400;

/// Runtime settings for the regional gate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Geolocation endpoint; the client address is appended as a path segment.
    pub lookup_endpoint: String,
    /// Bound on one lookup, retries included, in milliseconds.
    pub timeout_ms: u64,
    /// Extra attempts after a failed lookup.
    pub max_retries: u32,
    /// Per-address cache lifetime; caching is off when unset.
    pub cache_ttl_secs: Option<u64>,
    /// Most addresses the cache holds before evicting the least recently used.
    pub cache_capacity: usize,
    /// Skip the lookup for addresses that are not valid IPs.
    pub validate_addresses: bool,
    /// Cut multi-hop forwarding headers to their first hop.
    pub split_forwarded: bool,
    /// Headers consulted for the client address, in priority order.
    pub address_headers: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookup_endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: 2000,
            max_retries: 0,
            cache_ttl_secs: None,
            cache_capacity: DEFAULT_CAPACITY,
            validate_addresses: false,
            split_forwarded: false,
            address_headers: AddressResolver::default().headers,
        }
    }
}

impl Settings {
    /// Load settings: defaults, then the optional TOML file at `path`, then
    /// `REGIONAL__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let builder = config::Config::builder();

        let builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(false)),
            None => builder,
        };

        let built = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let settings: Settings = built.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string, without environment overrides.
    pub fn from_toml(source: &str) -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lookup_endpoint.trim().is_empty() {
            return Err(RegionError::Config("lookup_endpoint is empty".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(RegionError::Config("timeout_ms must be non-zero".to_string()));
        }
        if self.max_retries > MAX_RETRIES {
            return Err(RegionError::Config(format!(
                "max_retries must be at most {MAX_RETRIES}"
            )));
        }
        if self.cache_ttl_secs.is_some_and(|ttl| ttl > MAX_CACHE_TTL_SECS) {
            return Err(RegionError::Config(format!(
                "cache_ttl_secs must be at most {MAX_CACHE_TTL_SECS}"
            )));
        }
        if self.cache_capacity == 0 {
            return Err(RegionError::Config("cache_capacity must be non-zero".to_string()));
        }
        if self.address_headers.is_empty() {
            return Err(RegionError::Config("address_headers is empty".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    pub fn resolver(&self) -> AddressResolver {
        AddressResolver::new()
            .with_headers(self.address_headers.clone())
            .split_forwarded(self.split_forwarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.lookup_endpoint, "http://ip-api.com/json");
        assert_eq!(settings.timeout(), Duration::from_secs(2));
        assert_eq!(settings.cache_ttl(), None);
        assert_eq!(settings.address_headers, vec!["client-ip", "x-forwarded-for"]);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_from_toml_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            lookup_endpoint = "http://geo.internal/json"
            timeout_ms = 750
            cache_ttl_secs = 300
            split_forwarded = true
            "#,
        )
        .unwrap();

        assert_eq!(settings.lookup_endpoint, "http://geo.internal/json");
        assert_eq!(settings.timeout(), Duration::from_millis(750));
        assert_eq!(settings.cache_ttl(), Some(Duration::from_secs(300)));
        assert!(settings.split_forwarded);
        assert_eq!(settings.max_retries, 0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(matches!(
            Settings::from_toml("timeout_ms = 0"),
            Err(RegionError::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("max_retries = 9"),
            Err(RegionError::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("lookup_endpoint = \"\""),
            Err(RegionError::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("cache_capacity = 0"),
            Err(RegionError::Config(_))
        ));
    }

    #[test]
    fn test_cache_ttl_upper_bound() {
        assert!(matches!(
            Settings::from_toml("cache_ttl_secs = 9223372036854775807"),
            Err(RegionError::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("cache_ttl_secs = 86401"),
            Err(RegionError::Config(_))
        ));

        let settings = Settings::from_toml("cache_ttl_secs = 86400").unwrap();
        assert_eq!(settings.cache_ttl(), Some(Duration::from_secs(MAX_CACHE_TTL_SECS)));
        assert_eq!(settings.cache_capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "validate_addresses = true\nmax_retries = 2").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert!(settings.validate_addresses);
        assert_eq!(settings.max_retries, 2);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let settings = Settings::load(Some(Path::new("/nonexistent/regional.toml"))).unwrap();
        assert_eq!(settings.timeout_ms, 2000);
    }
}
