/* src/error.rs */

use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that may fail with `RegionError`.
pub type Result<T> = std::result::Result<T, RegionError>;

/// Errors raised by the fallible edges of the crate.
///
/// Classification itself never surfaces these: the classifier turns every
/// lookup error into the default non-EU classification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    /// Address is not a valid IP address.
    #[error("Invalid IP address format: {0}")]
    InvalidAddress(String),

    /// Transport-level failure talking to the geolocation service.
    #[error("Geolocation request failed: {0}")]
    Network(String),

    /// Geolocation service did not answer in time.
    #[error("Geolocation request timed out after {0:?}")]
    Timeout(Duration),

    /// Geolocation service answered with a non-success status.
    #[error("Geolocation service returned HTTP {0}")]
    Status(u16),

    /// Response body could not be decoded.
    #[error("Malformed geolocation response: {0}")]
    Parse(String),

    /// Response decoded but carried no usable `countryCode`.
    #[error("Geolocation response has no countryCode")]
    MissingCountryCode,

    /// Version string is not dotted numeric.
    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    /// Settings could not be loaded or are inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Footer template failed to compile or render.
    #[error("Template error: {0}")]
    Render(String),
}

impl From<config::ConfigError> for RegionError {
    fn from(err: config::ConfigError) -> Self {
        RegionError::Config(err.to_string())
    }
}

impl From<handlebars::TemplateError> for RegionError {
    fn from(err: handlebars::TemplateError) -> Self {
        RegionError::Render(err.to_string())
    }
}

impl From<handlebars::RenderError> for RegionError {
    fn from(err: handlebars::RenderError) -> Self {
        RegionError::Render(err.to_string())
    }
}
