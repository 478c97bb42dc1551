use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::json;

use consoles_api::api::{create_router, AppState};
use consoles_api::console::{Console, ConsolePatch, ConsoleStore, InMemoryConsoleStore, NewConsole};
use consoles_api::error::{StoreError, StoreResult};

use crate::{json, send};

const MISSING_ID: &str = "000000000000000000000000";

fn app() -> Router {
    create_router(AppState::new(Arc::new(InMemoryConsoleStore::new())))
}

fn dreamcast() -> serde_json::Value {
    json!({ "name": "Dreamcast", "manufacturer": "Sega", "releaseYear": 1998 })
}

async fn create(app: &Router, body: serde_json::Value) -> serde_json::Value {
    let (status, bytes) = send(app, "POST", "/consoles", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    json(&bytes)
}

/// Store whose every call fails, to exercise the 500 paths.
struct BrokenStore;

fn broken() -> StoreError {
    StoreError::Invalid("backend offline".to_string())
}

#[async_trait]
impl ConsoleStore for BrokenStore {
    async fn list(&self) -> StoreResult<Vec<Console>> {
        Err(broken())
    }
    async fn create(&self, _console: NewConsole) -> StoreResult<Console> {
        Err(broken())
    }
    async fn get(&self, _id: &str) -> StoreResult<Console> {
        Err(broken())
    }
    async fn update(&self, _id: &str, _patch: ConsolePatch) -> StoreResult<Console> {
        Err(broken())
    }
    async fn delete(&self, _id: &str) -> StoreResult<()> {
        Err(broken())
    }
    async fn ping(&self) -> StoreResult<()> {
        Err(broken())
    }
}

#[tokio::test]
async fn list_is_empty_before_any_create() {
    let (status, bytes) = send(&app(), "GET", "/consoles", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&bytes), json!([]));
}

#[tokio::test]
async fn dreamcast_lifecycle() {
    let app = app();

    let created = create(&app, dreamcast()).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);
    assert_eq!(
        created,
        json!({ "id": id, "name": "Dreamcast", "manufacturer": "Sega", "releaseYear": 1998 })
    );

    let (status, bytes) = send(&app, "GET", &format!("/consoles/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&bytes), created);

    let (status, bytes) = send(&app, "DELETE", &format!("/consoles/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(bytes.is_empty());

    let (status, _) = send(&app, "GET", &format!("/consoles/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_returns_created_consoles() {
    let app = app();
    create(&app, dreamcast()).await;
    create(
        &app,
        json!({ "name": "PlayStation", "manufacturer": "Sony", "releaseYear": 1994 }),
    )
    .await;

    let (status, bytes) = send(&app, "GET", "/consoles", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<String> = json(&bytes)
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Dreamcast", "PlayStation"]);
}

#[tokio::test]
async fn duplicate_name_is_a_server_error() {
    let app = app();
    create(&app, dreamcast()).await;

    let (status, bytes) = send(&app, "POST", "/consoles", Some(dreamcast())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(bytes, b"Something went wrong");
}

#[tokio::test]
async fn incomplete_or_malformed_body_is_a_server_error() {
    let app = app();

    let (status, _) = send(
        &app,
        "POST",
        "/consoles",
        Some(json!({ "name": "Virtual Boy", "manufacturer": "Nintendo" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = send(
        &app,
        "POST",
        "/consoles",
        Some(json!({ "name": "Virtual Boy", "manufacturer": "Nintendo", "releaseYear": "soon" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // No JSON content type at all.
    let (status, bytes) = send(&app, "POST", "/consoles", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(bytes, b"Something went wrong");

    let (_, bytes) = send(&app, "GET", "/consoles", None).await;
    assert_eq!(json(&bytes), json!([]));
}

#[tokio::test]
async fn get_unknown_or_malformed_id_is_not_found() {
    let app = app();

    let (status, bytes) = send(&app, "GET", &format!("/consoles/{MISSING_ID}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(bytes, b"No record found for this console");

    let (status, _) = send(&app, "GET", "/consoles/not-an-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_changes_only_supplied_fields() {
    let app = app();
    let created = create(&app, dreamcast()).await;
    let id = created["id"].as_str().unwrap();

    let (status, bytes) = send(
        &app,
        "PUT",
        &format!("/consoles/{id}"),
        Some(json!({ "releaseYear": 1999 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json(&bytes),
        json!({ "id": id, "name": "Dreamcast", "manufacturer": "Sega", "releaseYear": 1999 })
    );

    let (_, bytes) = send(&app, "GET", &format!("/consoles/{id}"), None).await;
    assert_eq!(json(&bytes)["releaseYear"], 1999);
    assert_eq!(json(&bytes)["manufacturer"], "Sega");
}

#[tokio::test]
async fn update_with_empty_body_returns_current_record() {
    let app = app();
    let created = create(&app, dreamcast()).await;
    let id = created["id"].as_str().unwrap();

    let (status, bytes) = send(&app, "PUT", &format!("/consoles/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&bytes), created);
}

#[tokio::test]
async fn update_missing_record_is_not_found() {
    let (status, _) = send(
        &app(),
        "PUT",
        &format!("/consoles/{MISSING_ID}"),
        Some(json!({ "name": "Ghost" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_into_existing_name_is_a_server_error() {
    let app = app();
    create(&app, dreamcast()).await;
    let saturn = create(
        &app,
        json!({ "name": "Saturn", "manufacturer": "Sega", "releaseYear": 1994 }),
    )
    .await;
    let id = saturn["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/consoles/{id}"),
        Some(json!({ "name": "Dreamcast" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn delete_of_missing_id_still_succeeds() {
    let app = app();
    let (status, _) = send(&app, "DELETE", &format!("/consoles/{MISSING_ID}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", "/consoles/whatever", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn undefined_routes_get_the_html_page() {
    let app = app();
    let by_id = format!("/consoles/{MISSING_ID}");
    let cases = [
        ("GET", "/"),
        ("GET", "/console"),
        ("GET", "/consoles/"),
        ("GET", "/consoles/a/b/c"),
        ("POST", "/anything"),
        ("PATCH", "/consoles"),
        ("DELETE", "/consoles"),
        ("POST", by_id.as_str()),
    ];

    for (method, uri) in cases {
        let (status, bytes) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(bytes, b"<h1>Page not found!</h1>", "{method} {uri}");
    }
}

#[tokio::test]
async fn storage_failures_become_generic_500s() {
    let app = create_router(AppState::new(Arc::new(BrokenStore)));
    let id = format!("/consoles/{MISSING_ID}");
    let cases = [
        ("GET", "/consoles", None),
        ("POST", "/consoles", Some(dreamcast())),
        ("GET", id.as_str(), None),
        ("PUT", id.as_str(), Some(json!({ "name": "x" }))),
        ("DELETE", id.as_str(), None),
    ];

    for (method, uri, body) in cases {
        let (status, bytes) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(bytes, b"Something went wrong", "{method} {uri}");
    }

    let (status, bytes) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json(&bytes), json!({ "ready": false }));
}

#[tokio::test]
async fn undecodable_id_is_treated_as_unknown() {
    let app = app();
    create(&app, dreamcast()).await;
    let uri = "/consoles/%FF";

    let (status, bytes) = send(&app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(bytes, b"No record found for this console");

    let (status, bytes) = send(&app, "PUT", uri, Some(json!({ "releaseYear": 2001 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(bytes, b"No record found for this console");

    let (status, bytes) = send(&app, "DELETE", uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(bytes.is_empty());

    let (_, bytes) = send(&app, "GET", "/consoles", None).await;
    assert_eq!(json(&bytes).as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn update_without_content_type_changes_nothing() {
    let app = app();
    let created = create(&app, dreamcast()).await;
    let id = created["id"].as_str().unwrap();

    let (status, bytes) = send(&app, "PUT", &format!("/consoles/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&bytes), created);

    let (status, _) = send(&app, "PUT", &format!("/consoles/{MISSING_ID}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
