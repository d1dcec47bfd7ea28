//! Provider error type, capability traits and the adapter union.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::geo::Method;

/// Errors raised by adapters and the HTTP layer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be interpreted
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Input could not be converted to the provider's wire format
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Adapter misconfigured
    #[error("Configuration error: {0}")]
    Config(String),

    /// The adapter has no capability matching the request
    #[error("Provider '{source_name}' does not support {method}")]
    Unsupported { source_name: String, method: Method },
}

/// Known provider implementations, as named in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "arcgis", alias = "geocoder-arcgis")]
    ArcGis,
    #[serde(rename = "nominatim")]
    Nominatim,
    #[serde(rename = "osm-regions", alias = "osm")]
    OsmRegions,
    #[serde(rename = "w3w", alias = "w3w-node-wrapper")]
    What3Words,
}

impl ProviderKind {
    /// Canonical source name stamped on every result from this provider.
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::ArcGis => "arcgis",
            Self::Nominatim => "nominatim",
            Self::OsmRegions => "osm",
            Self::What3Words => "w3w",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source_name())
    }
}

/// Per-call tuning forwarded to adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParams {
    #[serde(default = "default_max_locations")]
    pub max_locations: u32,
    #[serde(default)]
    pub language: Option<String>,
}

fn default_max_locations() -> u32 {
    1
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            max_locations: default_max_locations(),
            language: None,
        }
    }
}

/// Input for region lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionQuery {
    pub lat: f64,
    pub lng: f64,
    pub fields: String,
}

/// Input for three-word-address lookups. `position` is `"lat,lng"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordsQuery {
    pub position: String,
}

/// Full-position geocoding capability.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str, params: &RequestParams) -> Result<Value, ProviderError>;

    /// `coords` is `"lon,lat"`.
    async fn reverse(&self, coords: &str, params: &RequestParams) -> Result<Value, ProviderError>;
}

/// Administrative region lookup for a point.
#[async_trait]
pub trait RegionLookup: Send + Sync {
    async fn get_regions(
        &self,
        query: &RegionQuery,
        params: &RequestParams,
    ) -> Result<Value, ProviderError>;
}

/// Point to three-word address.
#[async_trait]
pub trait WordLookup: Send + Sync {
    async fn position_to_words(
        &self,
        query: &WordsQuery,
        params: &RequestParams,
    ) -> Result<Value, ProviderError>;
}

/// Adapter variants, chosen when the configuration is built.
#[derive(Clone)]
pub enum Adapter {
    PrimaryGeocoder(Arc<dyn Geocoder>),
    RegionExtender(Arc<dyn RegionLookup>),
    WordExtender(Arc<dyn WordLookup>),
    GenericExtender(Arc<dyn Geocoder>),
}

impl Adapter {
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::PrimaryGeocoder(_) => "primary",
            Self::RegionExtender(_) => "region",
            Self::WordExtender(_) => "words",
            Self::GenericExtender(_) => "generic",
        }
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Adapter::{}", self.variant_name())
    }
}

/// Provider-shaped input produced by the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderInput {
    /// Geocode query text, or `"lon,lat"` for reverse.
    Text(String),
    Region(RegionQuery),
    Words(WordsQuery),
}

/// An adapter together with the provider it talks to.
#[derive(Debug, Clone)]
pub struct ConfiguredAdapter {
    pub kind: ProviderKind,
    pub adapter: Adapter,
}

impl ConfiguredAdapter {
    pub fn new(kind: ProviderKind, adapter: Adapter) -> Self {
        Self { kind, adapter }
    }

    pub fn source(&self) -> &'static str {
        self.kind.source_name()
    }

    /// Dispatch by capability. Mismatched input yields [`ProviderError::Unsupported`].
    pub async fn get(
        &self,
        method: Method,
        input: &ProviderInput,
        params: &RequestParams,
    ) -> Result<Value, ProviderError> {
        tracing::debug!(
            source = self.source(),
            variant = self.adapter.variant_name(),
            %method,
            "Dispatching provider call"
        );
        match (&self.adapter, input) {
            (Adapter::PrimaryGeocoder(g) | Adapter::GenericExtender(g), ProviderInput::Text(t)) => {
                match method {
                    Method::Geocode => g.geocode(t, params).await,
                    Method::Reverse => g.reverse(t, params).await,
                }
            }
            (Adapter::RegionExtender(r), ProviderInput::Region(q)) => {
                r.get_regions(q, params).await
            }
            (Adapter::WordExtender(w), ProviderInput::Words(q)) => {
                w.position_to_words(q, params).await
            }
            _ => Err(ProviderError::Unsupported {
                source_name: self.source().to_string(),
                method,
            }),
        }
    }
}
