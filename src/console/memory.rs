//! In-process console store.
//!
//! Keeps the same contract as the MongoDB store: ObjectId-shaped ids, unique
//! names, listing in insertion order. Used by the test-suite and by
//! `serve --in-memory`.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mongodb::bson::oid::ObjectId;

use super::store::ConsoleStore;
use super::types::{parse_id, Console, ConsolePatch, NewConsole};
use crate::error::{StoreError, StoreResult};

/// Console store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryConsoleStore {
    /// Records by id.
    records: DashMap<String, Console>,
    /// Owning id by name; the uniqueness index.
    names: DashMap<String, String>,
}

impl InMemoryConsoleStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored consoles.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn claim_name(&self, name: &str, id: &str) -> StoreResult<()> {
        match self.names.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateName(name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(id.to_string());
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ConsoleStore for InMemoryConsoleStore {
    async fn list(&self) -> StoreResult<Vec<Console>> {
        let mut consoles: Vec<Console> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        // ObjectIds grow monotonically, so id order is insertion order.
        consoles.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(consoles)
    }

    async fn create(&self, console: NewConsole) -> StoreResult<Console> {
        let id = ObjectId::new().to_hex();
        self.claim_name(&console.name, &id)?;

        let record = console.with_id(id.clone());
        self.records.insert(id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: &str) -> StoreResult<Console> {
        parse_id(id)?;
        self.records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, patch: ConsolePatch) -> StoreResult<Console> {
        patch.validate()?;
        parse_id(id)?;

        let mut record = self
            .records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(new_name) = patch.name.as_deref() {
            if new_name != record.name {
                self.claim_name(new_name, id)?;
                self.names.remove(&record.name);
            }
        }

        patch.apply(&mut record);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        if let Some((_, console)) = self.records.remove(id) {
            self.names.remove_if(&console.name, |_, owner| owner == id);
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
