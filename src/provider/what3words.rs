//! what3words adapter.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::http::JsonClient;
use super::types::{ProviderError, RequestParams, WordLookup, WordsQuery};

const DEFAULT_BASE_URL: &str = "https://api.what3words.com/v3";

pub struct What3Words {
    client: Arc<dyn JsonClient>,
    base_url: String,
    api_key: String,
}

impl What3Words {
    pub fn new(client: Arc<dyn JsonClient>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl WordLookup for What3Words {
    async fn position_to_words(
        &self,
        query: &WordsQuery,
        params: &RequestParams,
    ) -> Result<Value, ProviderError> {
        let mut q = vec![
            ("coordinates", query.position.clone()),
            ("key", self.api_key.clone()),
        ];
        if let Some(ref lang) = params.language {
            q.push(("language", lang.clone()));
        }

        let url = format!("{}/convert-to-3wa", self.base_url);
        self.client.get_json(&url, &q).await
    }
}
