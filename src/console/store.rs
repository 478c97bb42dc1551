use async_trait::async_trait;

use super::types::{Console, ConsolePatch, NewConsole};
use crate::error::StoreResult;

/// Persistence port for console records.
///
/// Implementations own the authoritative data and enforce name uniqueness at
/// write time. Handlers hold an `Arc<dyn ConsoleStore>` and keep no state of
/// their own between requests.
#[async_trait]
pub trait ConsoleStore: Send + Sync {
    /// Every stored console, possibly none.
    async fn list(&self) -> StoreResult<Vec<Console>>;

    /// Insert a record; storage assigns the id.
    async fn create(&self, console: NewConsole) -> StoreResult<Console>;

    /// Fetch one record. `NotFound` (or `InvalidId`) when nothing matches.
    async fn get(&self, id: &str) -> StoreResult<Console>;

    /// Apply a partial update and return the record as it is afterwards.
    async fn update(&self, id: &str, patch: ConsolePatch) -> StoreResult<Console>;

    /// Remove a record. Removing a missing id is not an error.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Round-trip to the backend, used by the readiness probe.
    async fn ping(&self) -> StoreResult<()>;
}
