//! HTTP API module for the console resource, health, metrics and docs.

pub mod handlers;
pub mod openapi;
pub mod routes;

pub use handlers::AppState;
pub use openapi::ApiDoc;
pub use routes::create_router;
