//! Console resource: record types, the storage port, and its adapters.
//!
//! This module handles:
//! - Console records and request shapes
//! - The `ConsoleStore` persistence trait
//! - MongoDB store for production
//! - In-memory store for tests and local runs

pub mod memory;
pub mod mongo;
pub mod store;
pub mod types;

pub use memory::InMemoryConsoleStore;
pub use mongo::MongoConsoleStore;
pub use store::ConsoleStore;
pub use types::{parse_id, Console, ConsoleInput, ConsolePatch, NewConsole};
