//! ArcGIS World Geocoding Service adapter.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::http::JsonClient;
use super::types::{Geocoder, ProviderError, RequestParams};

const DEFAULT_BASE_URL: &str =
    "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer";

/// Geocodes through `find` and reverse-geocodes through `reverseGeocode`.
///
/// Responses are returned untouched; `find` already carries a `locations`
/// array and `reverseGeocode` an `address` block (or an `error` object).
pub struct ArcGis {
    client: Arc<dyn JsonClient>,
    base_url: String,
    token: Option<String>,
}

impl ArcGis {
    pub fn new(client: Arc<dyn JsonClient>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn common_params(&self, params: &RequestParams) -> Vec<(&'static str, String)> {
        let mut q = vec![("f", "json".to_string())];
        if let Some(ref token) = self.token {
            q.push(("token", token.clone()));
        }
        if let Some(ref lang) = params.language {
            q.push(("langCode", lang.clone()));
        }
        q
    }
}

#[async_trait]
impl Geocoder for ArcGis {
    async fn geocode(&self, query: &str, params: &RequestParams) -> Result<Value, ProviderError> {
        let mut q = self.common_params(params);
        q.push(("text", query.to_string()));
        q.push(("maxLocations", params.max_locations.to_string()));
        q.push(("outFields", "*".to_string()));

        let url = format!("{}/find", self.base_url);
        self.client.get_json(&url, &q).await
    }

    async fn reverse(&self, coords: &str, params: &RequestParams) -> Result<Value, ProviderError> {
        let mut q = self.common_params(params);
        q.push(("location", coords.to_string()));

        let url = format!("{}/reverseGeocode", self.base_url);
        self.client.get_json(&url, &q).await
    }
}
