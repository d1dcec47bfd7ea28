//! Error taxonomy surfaced to callers as `{code, msg}`.

use serde::Serialize;
use thiserror::Error;

use crate::provider::ProviderError;

/// Errors returned by the public aggregator surface.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Input failed validation before any provider was called.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Geocoding found no location for the given address.
    #[error("Address {query} could not be geocoded!")]
    NotGeocodable { query: String },

    /// No primary provider produced a usable result.
    #[error("No provider returned a usable result")]
    NotFound,

    /// Unexpected adapter or network failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GeocodeError {
    /// Numeric code mirroring the HTTP status it maps to.
    pub fn code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::NotGeocodable { .. } => 400,
            Self::NotFound => 404,
            Self::Internal(_) => 500,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            msg: self.to_string(),
        }
    }
}

impl From<ProviderError> for GeocodeError {
    fn from(e: ProviderError) -> Self {
        Self::Internal(format!("provider failure ({})", e))
    }
}

/// Serializable `{code, msg}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub code: u16,
    pub msg: String,
}
