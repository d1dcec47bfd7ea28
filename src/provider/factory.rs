//! Builds configured adapters from provider specs.

use std::sync::Arc;

use super::arcgis::ArcGis;
use super::http::JsonClient;
use super::nominatim::Nominatim;
use super::osm_regions::OsmRegions;
use super::types::{Adapter, ConfiguredAdapter, Geocoder, ProviderError, ProviderKind};
use super::what3words::What3Words;
use crate::config::ProviderSpec;

/// Shares one HTTP client across every adapter it creates.
pub struct ProviderFactory {
    client: Arc<dyn JsonClient>,
}

impl ProviderFactory {
    pub fn new(client: Arc<dyn JsonClient>) -> Self {
        Self { client }
    }

    /// Adapter for the primary chain. Only full geocoders qualify.
    pub fn create_primary(&self, spec: &ProviderSpec) -> Result<ConfiguredAdapter, ProviderError> {
        match spec.kind {
            ProviderKind::ArcGis | ProviderKind::Nominatim => Ok(ConfiguredAdapter::new(
                spec.kind,
                Adapter::PrimaryGeocoder(self.geocoder(spec)),
            )),
            ProviderKind::OsmRegions | ProviderKind::What3Words => {
                Err(ProviderError::Config(format!(
                    "'{}' cannot produce positions and is only usable as an extender",
                    spec.kind
                )))
            }
        }
    }

    /// Adapter for the extender fan-out.
    pub fn create_extender(&self, spec: &ProviderSpec) -> Result<ConfiguredAdapter, ProviderError> {
        let adapter = match spec.kind {
            ProviderKind::ArcGis | ProviderKind::Nominatim => {
                Adapter::GenericExtender(self.geocoder(spec))
            }
            ProviderKind::OsmRegions => {
                let url = spec.param_str(&["url"]).ok_or_else(|| {
                    ProviderError::Config("osm-regions requires params.url".into())
                })?;
                Adapter::RegionExtender(Arc::new(OsmRegions::new(Arc::clone(&self.client), url)))
            }
            ProviderKind::What3Words => {
                let key = spec
                    .param_str(&["api_key", "apiKey", "key"])
                    .ok_or_else(|| ProviderError::Config("w3w requires params.apiKey".into()))?;
                let mut w3w = What3Words::new(Arc::clone(&self.client), key);
                if let Some(url) = spec.param_str(&["base_url"]) {
                    w3w = w3w.with_base_url(url);
                }
                Adapter::WordExtender(Arc::new(w3w))
            }
        };
        Ok(ConfiguredAdapter::new(spec.kind, adapter))
    }

    fn geocoder(&self, spec: &ProviderSpec) -> Arc<dyn Geocoder> {
        let client = Arc::clone(&self.client);
        let base_url = spec.param_str(&["base_url"]);
        match spec.kind {
            ProviderKind::Nominatim => {
                let mut n = Nominatim::new(client).with_email(spec.param_str(&["email"]));
                if let Some(url) = base_url {
                    n = n.with_base_url(url);
                }
                Arc::new(n)
            }
            _ => {
                let mut a = ArcGis::new(client).with_token(spec.param_str(&["token"]));
                if let Some(url) = base_url {
                    a = a.with_base_url(url);
                }
                Arc::new(a)
            }
        }
    }
}
