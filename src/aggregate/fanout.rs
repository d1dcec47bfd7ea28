//! Concurrent extender fan-out with settle-all semantics.

use futures::future::join_all;
use tracing::{debug, warn};

use super::normalize::{format_input, format_output, has_error_flag};
use crate::geo::{AggregateRequest, Method, ProviderResult};
use crate::provider::{ConfiguredAdapter, ProviderError, RequestParams};

/// What one extender produced. An empty `Ok` means "nothing to add".
#[derive(Debug, Clone)]
pub struct ExtendOutcome {
    pub source: &'static str,
    pub result: Result<Vec<ProviderResult>, ProviderError>,
}

/// Runs every configured extender for each request.
pub struct Extender {
    extenders: Vec<ConfiguredAdapter>,
}

impl Extender {
    pub fn new(extenders: Vec<ConfiguredAdapter>) -> Self {
        Self { extenders }
    }

    pub fn len(&self) -> usize {
        self.extenders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extenders.is_empty()
    }

    /// Call all extenders concurrently and wait for every one to settle.
    ///
    /// Outcomes come back in configuration order; a failing extender never
    /// affects the others.
    pub async fn extend(
        &self,
        method: Method,
        request: &AggregateRequest,
        params: &RequestParams,
    ) -> Vec<ExtendOutcome> {
        let calls = self
            .extenders
            .iter()
            .map(|ext| async move {
                let result = extend_one(ext, method, request, params).await;
                if let Err(ref e) = result {
                    warn!(source = ext.source(), %method, error = %e, "Extender failed");
                }
                ExtendOutcome {
                    source: ext.source(),
                    result,
                }
            });
        join_all(calls).await
    }
}

async fn extend_one(
    ext: &ConfiguredAdapter,
    method: Method,
    request: &AggregateRequest,
    params: &RequestParams,
) -> Result<Vec<ProviderResult>, ProviderError> {
    let input = format_input(ext, method, request)?;
    let raw = ext.get(method, &input, params).await?;
    if has_error_flag(&raw) {
        return Err(ProviderError::InvalidResponse(format!(
            "{} returned error {}",
            ext.source(),
            raw["error"]
        )));
    }
    let results = format_output(ext, method, &raw, request).unwrap_or_default();
    debug!(source = ext.source(), fragments = results.len(), "Extender settled");
    Ok(results)
}
