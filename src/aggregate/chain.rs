//! Primary-provider chain: first success wins.

use tracing::{debug, info, warn};

use super::normalize::{format_input, format_output, has_error_flag, is_success};
use crate::error::GeocodeError;
use crate::geo::{AggregateRequest, Method, ProviderResult};
use crate::provider::{ConfiguredAdapter, ProviderError, RequestParams};

/// Tries primary providers strictly one at a time, in configured order.
pub struct ChainResolver {
    providers: Vec<ConfiguredAdapter>,
}

impl ChainResolver {
    pub fn new(providers: Vec<ConfiguredAdapter>) -> Self {
        Self { providers }
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Resolve through the chain.
    ///
    /// Each provider is asked in turn; a failed call, an error-flagged or
    /// unsuccessful response, or a response that normalizes to nothing moves
    /// on to the next one. Exhausting the list yields [`GeocodeError::NotFound`]
    /// when at least one provider answered cleanly, and
    /// [`GeocodeError::Internal`] wrapping the last failure when every
    /// provider failed.
    pub async fn resolve(
        &self,
        method: Method,
        request: &AggregateRequest,
        params: &RequestParams,
    ) -> Result<Vec<ProviderResult>, GeocodeError> {
        let mut last_error: Option<ProviderError> = None;
        let mut answered = false;

        for (attempt, provider) in self.providers.iter().enumerate() {
            let source = provider.source();

            let input = match format_input(provider, method, request) {
                Ok(input) => input,
                Err(e) => {
                    warn!(source, attempt, error = %e, "Skipping provider");
                    last_error = Some(e);
                    continue;
                }
            };

            let raw = match provider.get(method, &input, params).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(source, attempt, %method, error = %e, "Provider call failed");
                    last_error = Some(e);
                    continue;
                }
            };

            if has_error_flag(&raw) {
                warn!(
                    source,
                    attempt,
                    %method,
                    error = %raw["error"],
                    "Provider returned an error"
                );
                last_error = Some(ProviderError::InvalidResponse(format!(
                    "{} returned error {}",
                    source, raw["error"]
                )));
                continue;
            }
            answered = true;
            if !is_success(method, &raw) {
                debug!(source, attempt, %method, "No usable result");
                continue;
            }

            match format_output(provider, method, &raw, request) {
                Some(results) => {
                    info!(
                        source,
                        attempt,
                        %method,
                        results = results.len(),
                        "Provider resolved request"
                    );
                    return Ok(results);
                }
                None => debug!(source, attempt, %method, "Response normalized to nothing"),
            }
        }

        match last_error {
            Some(e) if !answered => Err(e.into()),
            _ => Err(GeocodeError::NotFound),
        }
    }
}
