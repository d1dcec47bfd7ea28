mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use state::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::aggregate::Georcoder;

pub fn build_router(georcoder: Georcoder) -> Router {
    let state = Arc::new(AppState { georcoder });

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/geocode", get(handlers::geocode))
        .route("/api/reverse", get(handlers::reverse))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(georcoder: Georcoder, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(georcoder);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Georcoder server listening on http://{}", addr);
    axum::serve(listener, app).await
}
