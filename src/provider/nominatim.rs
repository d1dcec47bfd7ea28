//! OpenStreetMap Nominatim adapter.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use super::http::JsonClient;
use super::types::{Geocoder, ProviderError, RequestParams};
use crate::geo::Coordinates;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Nominatim `search` / `reverse`.
///
/// `search` answers with a bare array; it is wrapped as `{"locations": [...]}`
/// so every primary geocoder exposes the same success shape.
pub struct Nominatim {
    client: Arc<dyn JsonClient>,
    base_url: String,
    email: Option<String>,
}

impl Nominatim {
    pub fn new(client: Arc<dyn JsonClient>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            email: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Contact address sent with every request, per the Nominatim usage policy.
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    fn common_params(&self, params: &RequestParams) -> Vec<(&'static str, String)> {
        let mut q = vec![
            ("format", "jsonv2".to_string()),
            ("addressdetails", "1".to_string()),
        ];
        if let Some(ref email) = self.email {
            q.push(("email", email.clone()));
        }
        if let Some(ref lang) = params.language {
            q.push(("accept-language", lang.clone()));
        }
        q
    }
}

#[async_trait]
impl Geocoder for Nominatim {
    async fn geocode(&self, query: &str, params: &RequestParams) -> Result<Value, ProviderError> {
        let mut q = self.common_params(params);
        q.push(("q", query.to_string()));
        q.push(("limit", params.max_locations.clamp(1, 50).to_string()));

        let url = format!("{}/search", self.base_url);
        match self.client.get_json(&url, &q).await? {
            Value::Array(results) => Ok(json!({ "locations": results })),
            other => Err(ProviderError::InvalidResponse(format!(
                "expected array from Nominatim search, got {}",
                other
            ))),
        }
    }

    async fn reverse(&self, coords: &str, params: &RequestParams) -> Result<Value, ProviderError> {
        let point = coords
            .parse::<Coordinates>()
            .map_err(|e| ProviderError::InvalidInput(e.to_string()))?;

        let mut q = self.common_params(params);
        q.push(("lat", point.lat.to_string()));
        q.push(("lon", point.lon.to_string()));

        let url = format!("{}/reverse", self.base_url);
        self.client.get_json(&url, &q).await
    }
}
