//! HTTP client abstraction for testability

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{trace, warn};

use super::types::ProviderError;

const USER_AGENT: &str = "Georcoder/0.3 (geocoding-aggregator)";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// JSON-over-HTTP GET, the only transport the adapters need.
///
/// Adapters hold an `Arc<dyn JsonClient>` so tests can substitute canned
/// responses for the network.
#[async_trait]
pub trait JsonClient: Send + Sync {
    /// Performs a GET with the given query pairs and decodes the body as JSON.
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ProviderError>;
}

/// Real client backed by a blocking `ureq` agent run on the blocking pool.
#[derive(Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build();
        Self { agent }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JsonClient for UreqClient {
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, ProviderError> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let query: Vec<(String, String)> = query
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        trace!(url = %url, params = query.len(), "HTTP GET");

        tokio::task::spawn_blocking(move || {
            let mut request = agent.get(&url);
            for (k, v) in &query {
                request = request.query(k, v);
            }
            let response = request.call().map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                ProviderError::Http(e.to_string())
            })?;
            response
                .into_json::<Value>()
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
        })
        .await
        .map_err(|e| ProviderError::Http(format!("request task failed: {}", e)))?
    }
}
