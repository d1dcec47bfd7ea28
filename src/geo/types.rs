//! Core types for the aggregation engine.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::coords::Coordinates;

/// Free-form feature properties. Insertion order is kept.
pub type Properties = serde_json::Map<String, Value>;

/// GeoJSON point geometry. Serializes as `{"type": "Point", "coordinates": [lon, lat]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Point")]
pub struct Geometry {
    pub coordinates: Coordinates,
}

/// Canonical record returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct GeoFeature {
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: Properties,
}

impl GeoFeature {
    pub fn new(coordinates: Coordinates, properties: Properties) -> Self {
        Self {
            geometry: Geometry { coordinates },
            properties,
        }
    }

    /// Geometry-only feature with empty properties.
    pub fn bare(coordinates: Coordinates) -> Self {
        Self::new(coordinates, Properties::new())
    }

    pub fn coordinates(&self) -> Coordinates {
        self.geometry.coordinates
    }
}

/// Properties contributed by an extender. Carries no geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyFragment(pub Properties);

impl PropertyFragment {
    /// Fragment holding a single `key: value` entry.
    pub fn single(key: impl Into<String>, value: Value) -> Self {
        let mut props = Properties::new();
        props.insert(key.into(), value);
        Self(props)
    }

    /// Shallow-merge into `target`; keys already present are overwritten.
    pub fn apply_to(&self, target: &mut Properties) {
        for (k, v) in &self.0 {
            target.insert(k.clone(), v.clone());
        }
    }
}

/// Routing tag for [`ProviderResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Primary,
    Extend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Feature(GeoFeature),
    Fragment(PropertyFragment),
}

/// One normalized contribution from a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResult {
    pub kind: ResultKind,
    pub source: String,
    pub payload: Payload,
}

impl ProviderResult {
    pub fn primary(source: impl Into<String>, feature: GeoFeature) -> Self {
        Self {
            kind: ResultKind::Primary,
            source: source.into(),
            payload: Payload::Feature(feature),
        }
    }

    pub fn extend(source: impl Into<String>, fragment: PropertyFragment) -> Self {
        Self {
            kind: ResultKind::Extend,
            source: source.into(),
            payload: Payload::Fragment(fragment),
        }
    }
}

/// Which provider operation is being aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Geocode,
    Reverse,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geocode => write!(f, "geocode"),
            Self::Reverse => write!(f, "reverse"),
        }
    }
}

/// Per-call input: an address for geocoding or a point for reverse geocoding.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateRequest {
    Address(String),
    Coordinates(Coordinates),
}

impl AggregateRequest {
    /// Anything that parses as `"lon,lat"` is a coordinate request; the rest is an address.
    pub fn parse(input: &str) -> Self {
        match input.parse::<Coordinates>() {
            Ok(c) => Self::Coordinates(c),
            Err(_) => Self::Address(input.trim().to_string()),
        }
    }

    /// Text handed to primary providers.
    pub fn query_string(&self) -> String {
        match self {
            Self::Address(a) => a.clone(),
            Self::Coordinates(c) => c.to_lon_lat(),
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Self::Coordinates(c) => Some(*c),
            Self::Address(_) => None,
        }
    }
}

impl fmt::Display for AggregateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(a) => write!(f, "{}", a),
            Self::Coordinates(c) => write!(f, "{}", c),
        }
    }
}
