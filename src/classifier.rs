/* src/classifier.rs */

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::ClassificationCache;
use crate::error::{RegionError, Result};
use crate::resolver::ClientAddress;

/// Lower-case ISO country codes treated as EU.
pub const EU_COUNTRIES: [&str; 29] = [
    "it", "de", "fr", "lu", "gr", "mf", "es", "sk", "lt", "nl", "at", "bg", "si", "cy", "be",
    "ro", "hr", "pt", "pl", "lv", "ee", "cz", "fi", "hu", "dk", "se", "ie", "im", "mt",
];

/// Check a country code against the EU set, ignoring case.
pub fn is_eu_country(code: &str) -> bool {
    let code = code.trim().to_lowercase();
    EU_COUNTRIES.contains(&code.as_str())
}

/// Outcome of classifying one client address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionClassification {
    pub is_eu: bool,
    /// Lower-cased country code, `None` when the lookup failed.
    pub country_code: Option<String>,
    pub address: ClientAddress,
}

impl RegionClassification {
    pub fn new(is_eu: bool, country_code: Option<String>, address: ClientAddress) -> Self {
        Self {
            is_eu,
            country_code,
            address,
        }
    }

    /// Default classification: non-EU, country unknown.
    pub fn unknown(address: ClientAddress) -> Self {
        Self::new(false, None, address)
    }

    /// Classify from a known country code.
    pub fn from_country(address: ClientAddress, code: &str) -> Self {
        let code = code.trim().to_lowercase();
        Self::new(is_eu_country(&code), Some(code), address)
    }
}

/// Source of country codes for client addresses.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Look up the country code of `address`.
    async fn country_code(&self, address: &ClientAddress) -> Result<String>;
}

#[async_trait]
impl<L: GeoLookup + ?Sized> GeoLookup for Arc<L> {
    async fn country_code(&self, address: &ClientAddress) -> Result<String> {
        (**self).country_code(address).await
    }
}

/// Maps client addresses to EU/non-EU classifications.
///
/// `classify` is total: lookup failures of any kind produce the default
/// non-EU classification so that content selection always has an answer.
#[derive(Debug, Clone)]
pub struct RegionClassifier<L> {
    lookup: L,
    cache: Option<Arc<ClassificationCache>>,
    validate_addresses: bool,
}

impl<L: GeoLookup> RegionClassifier<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: None,
            validate_addresses: false,
        }
    }

    /// Enable a per-address cache holding up to `capacity` addresses for `ttl`.
    pub fn with_cache(mut self, ttl: Duration, capacity: usize) -> Self {
        self.cache = Some(Arc::new(ClassificationCache::new(ttl, capacity)));
        self
    }

    /// Share an existing cache between classifiers.
    pub fn with_shared_cache(mut self, cache: Arc<ClassificationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Skip the lookup for addresses that are not valid IPs.
    pub fn validate_addresses(mut self, validate: bool) -> Self {
        self.validate_addresses = validate;
        self
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn cache(&self) -> Option<&ClassificationCache> {
        self.cache.as_deref()
    }

    /// Classify `address`, degrading to non-EU on any failure.
    pub async fn classify(&self, address: &ClientAddress) -> RegionClassification {
        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(address.as_str())) {
            debug!(address = %address, is_eu = cached.is_eu, "classification cache hit");
            return cached;
        }

        match self.try_classify(address).await {
            Ok(classification) => {
                debug!(
                    address = %address,
                    country = ?classification.country_code,
                    is_eu = classification.is_eu,
                    "classified client address"
                );
                if let Some(cache) = &self.cache {
                    if !cache.insert(classification.clone()) {
                        debug!(address = %address, "classification not cached, expiry out of range");
                    }
                }
                classification
            }
            Err(err) => {
                warn!(address = %address, error = %err, "classification failed, using non-EU default");
                RegionClassification::unknown(address.clone())
            }
        }
    }

    async fn try_classify(&self, address: &ClientAddress) -> Result<RegionClassification> {
        if address.is_empty() {
            return Err(RegionError::InvalidAddress(String::new()));
        }
        if self.validate_addresses && address.parse_ip().is_none() {
            return Err(RegionError::InvalidAddress(address.to_string()));
        }

        let code = self.lookup.country_code(address).await?;
        if code.trim().is_empty() {
            return Err(RegionError::MissingCountryCode);
        }
        Ok(RegionClassification::from_country(address.clone(), &code))
    }
}
