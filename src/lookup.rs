/* src/lookup.rs */

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::classifier::GeoLookup;
use crate::error::{RegionError, Result};
use crate::resolver::ClientAddress;

/// Default geolocation endpoint; the address is appended as a path segment.
pub const DEFAULT_ENDPOINT: &str = "http://ip-api.com/json";

/// Default bound on a single lookup, retries included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound for configured retries.
pub const MAX_RETRIES: u32 = 3;

const RETRY_DELAY_MS: u64 = 100;

#[derive(Debug, Deserialize)]
struct GeoResponse {
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}

/// `GeoLookup` backed by an HTTP JSON geolocation service.
#[derive(Debug, Clone)]
pub struct HttpGeoLookup {
    client: Client,
    endpoint: String,
    timeout: Duration,
    retries: u32,
}

impl HttpGeoLookup {
    /// Create a lookup against [`DEFAULT_ENDPOINT`] with the default timeout.
    pub fn new() -> Result<Self> {
        Self::with_options(DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, 0)
    }

    /// Create a lookup against `endpoint`, retrying failed attempts up to
    /// `retries` times (capped at [`MAX_RETRIES`]). `timeout` bounds the whole
    /// lookup, backoff and retries included.
    pub fn with_options(endpoint: &str, timeout: Duration, retries: u32) -> Result<Self> {
        if timeout.is_zero() {
            return Err(RegionError::Config("lookup timeout must be non-zero".to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("regional/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegionError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
            retries: retries.min(MAX_RETRIES),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    fn url_for(&self, address: &ClientAddress) -> String {
        format!("{}/{}", self.endpoint, address.as_str().trim())
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await.map_err(|e| self.map_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegionError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        parse_country_code(&body)
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut last_error = RegionError::Network("no attempt made".to_string());

        for attempt in 0..=self.retries {
            if attempt > 0 {
                let delay = RETRY_DELAY_MS * (1 << (attempt - 1));
                debug!("Retry {} after {}ms for {}", attempt, delay, url);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.fetch_once(url).await {
                Ok(code) => return Ok(code),
                // A well-formed answer without a country will not change on retry.
                Err(err @ (RegionError::MissingCountryCode | RegionError::Parse(_))) => {
                    return Err(err);
                }
                Err(err) => last_error = err,
            }
        }

        Err(last_error)
    }

    fn map_error(&self, err: reqwest::Error) -> RegionError {
        if err.is_timeout() {
            RegionError::Timeout(self.timeout)
        } else {
            RegionError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl GeoLookup for HttpGeoLookup {
    async fn country_code(&self, address: &ClientAddress) -> Result<String> {
        let url = self.url_for(address);
        tokio::time::timeout(self.timeout, self.fetch_with_retry(&url))
            .await
            .map_err(|_| RegionError::Timeout(self.timeout))?
    }
}

/// Extract `countryCode` from a geolocation response body.
pub fn parse_country_code(body: &str) -> Result<String> {
    let response: GeoResponse =
        serde_json::from_str(body).map_err(|e| RegionError::Parse(e.to_string()))?;

    match response.country_code {
        Some(code) if !code.trim().is_empty() => Ok(code),
        _ => Err(RegionError::MissingCountryCode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_country_code() {
        let body = r#"{"status":"success","country":"Germany","countryCode":"DE"}"#;
        assert_eq!(parse_country_code(body), Ok("DE".to_string()));
    }

    #[test]
    fn test_parse_missing_field() {
        assert_eq!(parse_country_code("{}"), Err(RegionError::MissingCountryCode));
        assert_eq!(
            parse_country_code(r#"{"status":"fail","message":"private range"}"#),
            Err(RegionError::MissingCountryCode)
        );
        assert_eq!(
            parse_country_code(r#"{"countryCode":""}"#),
            Err(RegionError::MissingCountryCode)
        );
    }

    #[test]
    fn test_parse_non_json() {
        assert!(matches!(
            parse_country_code("a:1:{s:11:\"countryCode\";s:2:\"DE\";}"),
            Err(RegionError::Parse(_))
        ));
    }

    #[test]
    fn test_url_and_options() {
        let lookup =
            HttpGeoLookup::with_options("http://localhost:9999/json/", Duration::from_secs(1), 10)
                .unwrap();
        assert_eq!(
            lookup.url_for(&ClientAddress::from("2.16.0.1")),
            "http://localhost:9999/json/2.16.0.1"
        );
        assert_eq!(lookup.retries(), MAX_RETRIES);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(matches!(
            HttpGeoLookup::with_options(DEFAULT_ENDPOINT, Duration::ZERO, 0),
            Err(RegionError::Config(_))
        ));
    }
}
