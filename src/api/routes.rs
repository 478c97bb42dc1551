//! HTTP API route definitions.

use axum::middleware;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use utoipa::OpenApi;

use super::handlers::{
    create_console, delete_console, get_console, health, list_consoles, metrics_text, not_found,
    ready, update_console, AppState,
};
use super::openapi::ApiDoc;
use crate::metrics::track_http;

/// Create the API router.
///
/// Unknown paths and unsupported methods on known paths both answer with the
/// HTML 404 page rather than axum's default 404/405.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Console resource
        .route(
            "/consoles",
            get(list_consoles).post(create_console).fallback(not_found),
        )
        .route(
            "/consoles/:id",
            get(get_console)
                .put(update_console)
                .delete(delete_console)
                .fallback(not_found),
        )
        // Health endpoints
        .route("/health", get(health).fallback(not_found))
        .route("/ready", get(ready).fallback(not_found))
        // Observability
        .route("/metrics", get(metrics_text).fallback(not_found))
        .route("/api-docs/openapi.json", get(openapi_json).fallback(not_found))
        .fallback(not_found)
        .layer(middleware::from_fn(track_http))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
