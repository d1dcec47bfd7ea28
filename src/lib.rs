//! # Georcoder
//!
//! Geocoding aggregator. A request is answered by the first primary
//! provider that succeeds, enriched concurrently by every extender, and
//! returned as GeoJSON point features.
//!
//! ```ignore
//! let config = AggregatorConfig::load(None)?;
//! let georcoder = Georcoder::new(&config)?;
//! let features = georcoder.reverse("13.4482975,52.4743293", &RequestParams::default()).await?;
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod geo;
pub mod provider;
pub mod server;

pub use aggregate::Georcoder;
pub use config::{AggregatorConfig, ProviderSpec};
pub use error::{ErrorBody, GeocodeError};
pub use geo::{AggregateRequest, Coordinates, GeoFeature, Method, PropertyFragment, ProviderResult};
pub use provider::{ProviderKind, RequestParams};
