//! # Regional
//!
//! Request-scoped regional content gating. For each request the crate
//! resolves the client address from forwarding headers, classifies it as EU
//! or non-EU through a time-bounded geolocation lookup, and selects the
//! matching post-visibility filter and footer content variant.
//!
//! ## Features
//!
//! - Client address resolution from `Client-IP`, `X-Forwarded-For` and the remote address
//! - EU classification that never fails: lookup errors yield the non-EU default
//! - Strict lookup timeout, bounded retries and an opt-in per-address cache
//! - Pure selection of query filters and footer variants, plus a footer renderer
//! - Optional Axum middleware and extractor integration via the `axum` feature
//!
//! ## Examples
//!
//! ### Content selection
//!
//! ```rust
//! use regional::{resolve_client_address, select_footer_variant, select_query_filter, HeaderMap};
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("client-ip".to_string(), "2.16.0.1".to_string());
//!
//! let address = resolve_client_address(&headers, Some("127.0.0.1"));
//! assert_eq!(address.as_str(), "2.16.0.1");
//!
//! let footer = select_footer_variant(true);
//! assert!(footer.disclaimer.text().contains("73%"));
//! assert_eq!(select_query_filter(false).clauses.len(), 1);
//! ```

pub mod cache;
pub mod classifier;
pub mod error;
pub mod footer;
pub mod lookup;
pub mod migration;
pub mod pipeline;
pub mod render;
pub mod resolver;
pub mod selector;
pub mod settings;

#[cfg(feature = "axum")]
pub mod middleware;

pub use cache::ClassificationCache;
pub use classifier::{EU_COUNTRIES, GeoLookup, RegionClassification, RegionClassifier, is_eu_country};
pub use error::{RegionError, Result};
pub use footer::{ContentVariant, Region, select_footer_variant};
pub use lookup::HttpGeoLookup;
pub use migration::{MemoryVersionStore, VersionStore, maybe_update_version};
pub use pipeline::{RegionGate, RegionalContent};
pub use render::{FooterRenderer, render_footer};
pub use resolver::{AddressResolver, ClientAddress, HeaderMap, resolve_client_address};
pub use selector::{PostMeta, PostVisibilityFilter, select_query_filter};
pub use settings::Settings;

#[cfg(feature = "axum")]
pub use middleware::{RegionLayer, RegionService};
