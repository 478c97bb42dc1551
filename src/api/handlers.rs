//! HTTP API handlers.
//!
//! Every console handler makes exactly one storage call and maps the outcome
//! through [`ApiError`], so status selection lives in one place.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use crate::console::{Console, ConsoleInput, ConsoleStore};
use crate::error::{ApiError, StoreError};
use crate::metrics;

/// Body of the catch-all 404.
pub const PAGE_NOT_FOUND_HTML: &str = "<h1>Page not found!</h1>";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Console persistence.
    pub store: Arc<dyn ConsoleStore>,
    /// Prometheus handle, present when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state over a store, without metrics exposition.
    pub fn new(store: Arc<dyn ConsoleStore>) -> Self {
        Self {
            store,
            metrics: None,
        }
    }

    /// Expose the given Prometheus handle on `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: String,
}

/// Readiness check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Whether storage answered.
    pub ready: bool,
}

/// Count real storage failures, then convert for the response.
fn storage_failure(operation: &'static str, err: StoreError) -> ApiError {
    if !matches!(err, StoreError::NotFound(_) | StoreError::InvalidId(_)) {
        metrics::inc_storage_errors(operation);
    }
    err.into()
}

fn read_body(body: Result<Json<ConsoleInput>, JsonRejection>) -> Result<ConsoleInput, ApiError> {
    body.map(|Json(input)| input)
        .map_err(|rejection| ApiError::Server(format!("unreadable request body: {rejection}")))
}

/// Update body: a request without a JSON content type changes nothing.
fn read_patch_body(
    body: Result<Json<ConsoleInput>, JsonRejection>,
) -> Result<ConsoleInput, ApiError> {
    match body {
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(ConsoleInput::default()),
        other => read_body(other),
    }
}

/// An id segment that cannot be decoded can never name a stored console.
fn path_id(path: Result<Path<String>, PathRejection>) -> Result<String, StoreError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| StoreError::InvalidId(rejection.body_text()))
}

/// List every console.
#[utoipa::path(
    get,
    path = "/consoles",
    tag = "consoles",
    responses(
        (status = 200, description = "All consoles, possibly none", body = [Console]),
        (status = 500, description = "Storage failure", body = String)
    )
)]
pub async fn list_consoles(State(state): State<AppState>) -> Result<Json<Vec<Console>>, ApiError> {
    let consoles = state
        .store
        .list()
        .await
        .map_err(|e| storage_failure("list", e))?;
    debug!(count = consoles.len(), "Listed consoles");
    Ok(Json(consoles))
}

/// Create a console.
#[utoipa::path(
    post,
    path = "/consoles",
    tag = "consoles",
    request_body = ConsoleInput,
    responses(
        (status = 201, description = "Created console with its assigned id", body = Console),
        (status = 500, description = "Malformed body, duplicate name or storage failure", body = String)
    )
)]
pub async fn create_console(
    State(state): State<AppState>,
    body: Result<Json<ConsoleInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Console>), ApiError> {
    let new = read_body(body)?.into_new()?;
    let created = state
        .store
        .create(new)
        .await
        .map_err(|e| storage_failure("create", e))?;
    debug!(id = %created.id, name = %created.name, "Created console");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Fetch one console.
#[utoipa::path(
    get,
    path = "/consoles/{id}",
    tag = "consoles",
    params(("id" = String, Path, description = "Console id")),
    responses(
        (status = 200, description = "The console", body = Console),
        (status = 404, description = "No console has this id", body = String),
        (status = 500, description = "Storage failure", body = String)
    )
)]
pub async fn get_console(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Console>, ApiError> {
    let id = path_id(path)?;
    let console = state
        .store
        .get(&id)
        .await
        .map_err(|e| storage_failure("get", e))?;
    Ok(Json(console))
}

/// Update the supplied fields of one console.
#[utoipa::path(
    put,
    path = "/consoles/{id}",
    tag = "consoles",
    params(("id" = String, Path, description = "Console id")),
    request_body = ConsoleInput,
    responses(
        (status = 200, description = "The console after the update", body = Console),
        (status = 404, description = "No console has this id", body = String),
        (status = 500, description = "Malformed body, duplicate name or storage failure", body = String)
    )
)]
pub async fn update_console(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<ConsoleInput>, JsonRejection>,
) -> Result<Json<Console>, ApiError> {
    let id = path_id(path)?;
    let patch = read_patch_body(body)?.into_patch();
    let updated = state
        .store
        .update(&id, patch)
        .await
        .map_err(|e| storage_failure("update", e))?;
    debug!(id = %updated.id, "Updated console");
    Ok(Json(updated))
}

/// Delete one console. Deleting a missing id still succeeds.
#[utoipa::path(
    delete,
    path = "/consoles/{id}",
    tag = "consoles",
    params(("id" = String, Path, description = "Console id")),
    responses(
        (status = 204, description = "Deleted, or nothing to delete"),
        (status = 500, description = "Storage failure", body = String)
    )
)]
pub async fn delete_console(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Ok(id) = path_id(path) else {
        // Nothing can be stored under an undecodable id.
        return Ok(StatusCode::NO_CONTENT);
    };
    state
        .store
        .delete(&id)
        .await
        .map_err(|e| storage_failure("delete", e))?;
    debug!(id = %id, "Deleted console");
    Ok(StatusCode::NO_CONTENT)
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is up", body = HealthResponse))
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness check handler - returns 200 if storage answers, 503 otherwise.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Storage reachable", body = ReadyResponse),
        (status = 503, description = "Storage unreachable", body = ReadyResponse)
    )
)]
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(ReadyResponse { ready: true })),
        Err(e) => {
            warn!(error = %e, "Readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadyResponse { ready: false }),
            )
        }
    }
}

/// Prometheus exposition; falls through to the 404 page without a recorder.
pub async fn metrics_text(State(state): State<AppState>) -> Response {
    match state.metrics {
        Some(handle) => handle.render().into_response(),
        None => not_found().await.into_response(),
    }
}

/// Catch-all for unknown paths and unsupported methods.
pub async fn not_found() -> (StatusCode, Html<&'static str>) {
    (StatusCode::NOT_FOUND, Html(PAGE_NOT_FOUND_HTML))
}
