//! Destination resolution
//!
//! A destination is `<category>:<suffix>`. The category selects a configured
//! base URL and the suffix is appended verbatim. There is no URL validation,
//! escaping or normalization beyond trimming trailing slashes off the base.

use thiserror::Error;

use crate::config::EndpointConfig;

/// The destination's category has no configured base URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no endpoint configured for category {category:?} (destination {destination:?})")]
pub struct UnroutableDestination {
    pub destination: String,
    pub category: String,
}

/// Maps destinations to delivery URLs
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    endpoints: EndpointConfig,
}

impl EndpointResolver {
    pub fn new(endpoints: EndpointConfig) -> Self {
        Self { endpoints }
    }

    /// Resolve a destination to the URL it should be delivered to
    ///
    /// - `gql:/foo` with `gql = "http://x"` → `http://x/foo`
    /// - `otel:/v1/traces` with `otel = "http://y/"` → `http://y/v1/traces`
    /// - `gql` (no suffix) → `http://x` unchanged
    pub fn resolve(&self, destination: &str) -> Result<String, UnroutableDestination> {
        let (category, suffix) = split_destination(destination);

        let base = self
            .endpoints
            .get(category)
            .ok_or_else(|| UnroutableDestination {
                destination: destination.to_string(),
                category: category.to_string(),
            })?;

        if suffix.is_empty() {
            Ok(base.to_string())
        } else {
            Ok(format!("{}{}", base.trim_end_matches('/'), suffix))
        }
    }
}

/// Split on the first `:`; a destination without one has an empty suffix
fn split_destination(destination: &str) -> (&str, &str) {
    destination.split_once(':').unwrap_or((destination, ""))
}
