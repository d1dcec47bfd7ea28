use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::GeocodeError;
use crate::geo::GeoFeature;
use crate::provider::RequestParams;

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

impl From<GeocodeError> for ApiError {
    fn from(e: GeocodeError) -> Self {
        let status = StatusCode::from_u16(e.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ApiError(status, e.to_string())
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/health ─────────────────────────────────────────────

pub async fn health() -> &'static str {
    "ok"
}

// ─── GET /api/geocode ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GeocodeQuery {
    pub q: Option<String>,
    pub max_locations: Option<u32>,
    pub lang: Option<String>,
}

pub async fn geocode(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GeocodeQuery>,
) -> Result<Json<Vec<GeoFeature>>, ApiError> {
    let query = params.q.as_deref().unwrap_or("").trim();
    if query.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'q' parameter"));
    }

    let request_params = request_params(params.max_locations, params.lang);
    let features = state.georcoder.geocode(query, &request_params).await?;
    Ok(Json(features))
}

// ─── GET /api/reverse ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReverseQuery {
    /// `lon,lat`
    pub coords: Option<String>,
    pub lang: Option<String>,
}

pub async fn reverse(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ReverseQuery>,
) -> Result<Json<Vec<GeoFeature>>, ApiError> {
    let coords = params.coords.as_deref().unwrap_or("").trim();
    if coords.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'coords' parameter (lon,lat)"));
    }

    let request_params = request_params(None, params.lang);
    let features = state.georcoder.reverse(coords, &request_params).await?;
    Ok(Json(features))
}

// ─── Helpers ─────────────────────────────────────────────────────

fn request_params(max_locations: Option<u32>, lang: Option<String>) -> RequestParams {
    let defaults = RequestParams::default();
    RequestParams {
        max_locations: max_locations.unwrap_or(defaults.max_locations),
        language: lang.filter(|l| !l.is_empty()),
    }
}
