//! OSM administrative-region lookup adapter.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::http::JsonClient;
use super::types::{ProviderError, RegionLookup, RegionQuery, RequestParams};

/// Queries a region service that returns the list of OSM boundary
/// relations containing a point, e.g. `[{"osm_id": "62422"}, ...]`.
pub struct OsmRegions {
    client: Arc<dyn JsonClient>,
    url: String,
}

impl OsmRegions {
    pub fn new(client: Arc<dyn JsonClient>, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl RegionLookup for OsmRegions {
    async fn get_regions(
        &self,
        query: &RegionQuery,
        _params: &RequestParams,
    ) -> Result<Value, ProviderError> {
        let q = [
            ("lat", query.lat.to_string()),
            ("lng", query.lng.to_string()),
            ("fields", query.fields.clone()),
        ];
        self.client.get_json(&self.url, &q).await
    }
}
