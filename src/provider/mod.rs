//! Provider adapters.
//!
//! Each upstream service sits behind one capability trait ([`Geocoder`],
//! [`RegionLookup`] or [`WordLookup`]) and is wrapped in an [`Adapter`]
//! variant when the configuration is built. Adapters return the provider's
//! raw JSON; turning that into canonical records is the normalizer's job.

mod arcgis;
mod factory;
pub mod http;
mod nominatim;
mod osm_regions;
mod types;
mod what3words;

pub use arcgis::ArcGis;
pub use factory::ProviderFactory;
pub use http::{JsonClient, UreqClient};
pub use nominatim::Nominatim;
pub use osm_regions::OsmRegions;
pub use types::{
    Adapter, ConfiguredAdapter, Geocoder, ProviderError, ProviderInput, ProviderKind,
    RegionLookup, RegionQuery, RequestParams, WordLookup, WordsQuery,
};
pub use what3words::What3Words;
