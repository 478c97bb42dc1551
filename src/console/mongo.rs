//! MongoDB-backed console store.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use super::store::ConsoleStore;
use super::types::{parse_id, Console, ConsolePatch, NewConsole};
use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::metrics;

/// Server error code for a unique index violation.
const DUPLICATE_KEY: i32 = 11000;

/// Console as stored in the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConsoleDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    manufacturer: String,
    #[serde(rename = "releaseYear")]
    release_year: i32,
}

impl From<ConsoleDocument> for Console {
    fn from(doc: ConsoleDocument) -> Self {
        Console {
            id: doc.id.to_hex(),
            name: doc.name,
            manufacturer: doc.manufacturer,
            release_year: doc.release_year,
        }
    }
}

/// Console store over a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoConsoleStore {
    database: Database,
    collection: Collection<ConsoleDocument>,
}

impl MongoConsoleStore {
    /// Connect, verify the server answers, and ensure the unique index on `name`.
    ///
    /// The driver connects lazily, so the ping is what turns an unreachable
    /// server into a startup failure.
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri).await?;
        let database = client.database(&config.database_name());
        let collection = database.collection::<ConsoleDocument>(&config.mongodb_collection);

        let store = Self {
            database,
            collection,
        };
        store.ping().await?;
        store.ensure_indexes().await?;

        info!(
            database = %store.database.name(),
            collection = %store.collection.name(),
            "Database connection established"
        );
        Ok(store)
    }

    async fn ensure_indexes(&self) -> StoreResult<()> {
        let unique_name = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(unique_name).await?;
        debug!("Unique index on name ensured");
        Ok(())
    }
}

/// `$set` body for a patch. Only supplied fields appear.
fn set_document(patch: &ConsolePatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = &patch.name {
        set.insert("name", name.as_str());
    }
    if let Some(manufacturer) = &patch.manufacturer {
        set.insert("manufacturer", manufacturer.as_str());
    }
    if let Some(release_year) = patch.release_year {
        set.insert("releaseYear", release_year);
    }
    set
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY,
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY,
        _ => false,
    }
}

/// Map a write failure, naming the duplicate when the unique index fired.
fn write_error(err: mongodb::error::Error, name: &str) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::DuplicateName(name.to_string())
    } else {
        StoreError::Backend(err)
    }
}

#[async_trait]
impl ConsoleStore for MongoConsoleStore {
    #[instrument(skip(self))]
    async fn list(&self) -> StoreResult<Vec<Console>> {
        let _timer = metrics::timer_storage("list");
        let docs: Vec<ConsoleDocument> = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(docs.into_iter().map(Console::from).collect())
    }

    #[instrument(skip(self, console), fields(name = %console.name))]
    async fn create(&self, console: NewConsole) -> StoreResult<Console> {
        let _timer = metrics::timer_storage("create");
        let doc = ConsoleDocument {
            id: ObjectId::new(),
            name: console.name,
            manufacturer: console.manufacturer,
            release_year: console.release_year,
        };
        self.collection
            .insert_one(&doc)
            .await
            .map_err(|e| write_error(e, &doc.name))?;
        Ok(doc.into())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &str) -> StoreResult<Console> {
        let _timer = metrics::timer_storage("get");
        let oid = parse_id(id)?;
        self.collection
            .find_one(doc! { "_id": oid })
            .await?
            .map(Console::from)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: &str, patch: ConsolePatch) -> StoreResult<Console> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get(id).await;
        }

        let _timer = metrics::timer_storage("update");
        let oid = parse_id(id)?;
        let renamed = patch.name.clone().unwrap_or_default();
        self.collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set_document(&patch) })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| write_error(e, &renamed))?
            .map(Console::from)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> StoreResult<()> {
        let _timer = metrics::timer_storage("delete");
        let oid = match parse_id(id) {
            Ok(oid) => oid,
            // Nothing can be stored under a malformed id.
            Err(_) => return Ok(()),
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        debug!(deleted = result.deleted_count, "Delete finished");
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
