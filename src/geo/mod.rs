//! Canonical data model shared by adapters, the normalizer and the merge engine.

pub mod coords;
pub mod types;

pub use coords::Coordinates;
pub use types::{
    AggregateRequest, GeoFeature, Geometry, Method, Payload, Properties, PropertyFragment,
    ProviderResult, ResultKind,
};
