/* src/pipeline.rs */

use serde::Serialize;
use tracing::debug;

use crate::classifier::{GeoLookup, RegionClassification, RegionClassifier};
use crate::error::Result;
use crate::footer::{ContentVariant, select_footer_variant};
use crate::lookup::HttpGeoLookup;
use crate::render::render_footer;
use crate::resolver::{AddressResolver, ClientAddress, HeaderMap};
use crate::selector::{PostVisibilityFilter, select_query_filter};
use crate::settings::Settings;

/// Everything selected for one request: one filter and one footer variant,
/// both derived from the same classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionalContent {
    pub classification: RegionClassification,
    pub filter: PostVisibilityFilter,
    pub footer: ContentVariant,
}

impl RegionalContent {
    pub fn from_classification(classification: RegionClassification) -> Self {
        let filter = select_query_filter(classification.is_eu);
        let footer = select_footer_variant(classification.is_eu);
        Self {
            classification,
            filter,
            footer,
        }
    }

    /// Non-EU content for an address that was never classified.
    pub fn fallback(address: ClientAddress) -> Self {
        Self::from_classification(RegionClassification::unknown(address))
    }

    pub fn is_eu(&self) -> bool {
        self.classification.is_eu
    }

    pub fn render_footer(&self) -> Result<String> {
        render_footer(&self.footer)
    }
}

/// Request chain: address resolution, classification, content selection.
#[derive(Debug, Clone)]
pub struct RegionGate<L> {
    resolver: AddressResolver,
    classifier: RegionClassifier<L>,
}

impl RegionGate<HttpGeoLookup> {
    /// Build an HTTP-backed gate from settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        let lookup = HttpGeoLookup::with_options(
            &settings.lookup_endpoint,
            settings.timeout(),
            settings.max_retries,
        )?;

        let mut classifier =
            RegionClassifier::new(lookup).validate_addresses(settings.validate_addresses);
        if let Some(ttl) = settings.cache_ttl() {
            classifier = classifier.with_cache(ttl, settings.cache_capacity);
        }

        Ok(Self::new(settings.resolver(), classifier))
    }
}

impl<L: GeoLookup> RegionGate<L> {
    pub fn new(resolver: AddressResolver, classifier: RegionClassifier<L>) -> Self {
        Self {
            resolver,
            classifier,
        }
    }

    /// Gate with default resolution over `lookup`, no cache.
    pub fn with_lookup(lookup: L) -> Self {
        Self::new(AddressResolver::default(), RegionClassifier::new(lookup))
    }

    pub fn resolver(&self) -> &AddressResolver {
        &self.resolver
    }

    pub fn classifier(&self) -> &RegionClassifier<L> {
        &self.classifier
    }

    /// Run the chain once for a request.
    pub async fn evaluate(&self, headers: &HeaderMap, remote_addr: Option<&str>) -> RegionalContent {
        let address = self.resolver.resolve(headers, remote_addr);
        let classification = self.classifier.classify(&address).await;
        let content = RegionalContent::from_classification(classification);
        debug!(
            address = %content.classification.address,
            variant = content.footer.name(),
            "selected regional content"
        );
        content
    }
}
