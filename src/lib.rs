//! Consoles API.
//!
//! A small HTTP service exposing one resource, game consoles, over a MongoDB
//! collection. Each route makes a single storage call and maps the outcome to
//! a status code:
//!
//! ```text
//! GET    /consoles       200 [Console]
//! POST   /consoles       201 Console | 500
//! GET    /consoles/:id   200 Console | 404 | 500
//! PUT    /consoles/:id   200 Console | 404 | 500
//! DELETE /consoles/:id   204         | 500
//! *                      404 <h1>Page not found!</h1>
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`console`]: Console records, storage trait and adapters
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod metrics;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, AppError, Result, StoreError};
