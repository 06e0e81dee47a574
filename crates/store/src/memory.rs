//! In-process document store.
//!
//! Used for local development when no `DATABASE_URL` is configured and as the
//! test double throughout the workspace. It supports fault injection so tests
//! can exercise backend outages and failed writes.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, watch};

use crate::document::{CollectionWatch, Document, DocumentStore, Fields};
use crate::error::StoreError;
use crate::path::{CollectionPath, DocumentPath};

struct Collection {
    docs: BTreeMap<String, Fields>,
    changes: watch::Sender<Vec<Document>>,
}

impl Collection {
    fn new() -> Self {
        let (changes, _) = watch::channel(Vec::new());
        Self {
            docs: BTreeMap::new(),
            changes,
        }
    }

    fn snapshot(&self) -> Vec<Document> {
        self.docs
            .iter()
            .map(|(id, data)| Document {
                id: id.clone(),
                data: data.clone(),
            })
            .collect()
    }

    fn publish(&self) {
        self.changes.send_replace(self.snapshot());
    }
}

/// Document store held entirely in memory.
pub struct MemoryStore {
    collections: Mutex<HashMap<CollectionPath, Collection>>,
    available: AtomicBool,
    failing_writes: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            failing_writes: AtomicUsize::new(0),
        }
    }

    /// Simulate the backend going down (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make the next `count` write operations fail with `Unavailable`.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_owned()))
        }
    }

    fn check_write(&self) -> Result<(), StoreError> {
        self.check_available()?;
        let injected = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if injected.is_ok() {
            return Err(StoreError::Unavailable("injected write failure".to_owned()));
        }
        Ok(())
    }

    async fn write<F>(&self, path: &DocumentPath, op: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BTreeMap<String, Fields>) -> Result<bool, StoreError> + Send,
    {
        self.check_write()?;
        let mut collections = self.collections.lock().await;
        let collection = collections
            .entry(path.collection().clone())
            .or_insert_with(Collection::new);
        if op(&mut collection.docs)? {
            collection.publish();
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        self.check_available()?;
        let collections = self.collections.lock().await;
        Ok(collections
            .get(path.collection())
            .and_then(|c| c.docs.get(path.id()))
            .map(|data| Document {
                id: path.id().to_owned(),
                data: data.clone(),
            }))
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        let collections = self.collections.lock().await;
        Ok(collections
            .get(collection)
            .map(Collection::snapshot)
            .unwrap_or_default())
    }

    async fn set(&self, path: &DocumentPath, data: Fields) -> Result<(), StoreError> {
        self.write(path, |docs| {
            docs.insert(path.id().to_owned(), data);
            Ok(true)
        })
        .await
    }

    async fn insert(&self, path: &DocumentPath, data: Fields) -> Result<(), StoreError> {
        self.write(path, |docs| {
            if docs.contains_key(path.id()) {
                return Err(StoreError::AlreadyExists(path.to_string()));
            }
            docs.insert(path.id().to_owned(), data);
            Ok(true)
        })
        .await
    }

    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        self.write(path, |docs| {
            let existing = docs
                .get_mut(path.id())
                .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            existing.extend(fields);
            Ok(true)
        })
        .await
    }

    async fn update_if(
        &self,
        path: &DocumentPath,
        field: &str,
        expected: &Value,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.write(path, |docs| {
            let existing = docs
                .get_mut(path.id())
                .ok_or_else(|| StoreError::NotFound(path.to_string()))?;
            if existing.get(field) != Some(expected) {
                return Err(StoreError::Precondition {
                    path: path.to_string(),
                    field: field.to_owned(),
                });
            }
            existing.extend(fields);
            Ok(true)
        })
        .await
    }

    async fn increment(
        &self,
        path: &DocumentPath,
        field: &str,
        delta: i64,
        max: i64,
        seed: Fields,
    ) -> Result<(), StoreError> {
        self.write(path, |docs| {
            let current = docs
                .get(path.id())
                .and_then(|doc| doc.get(field))
                .and_then(Value::as_i64)
                .unwrap_or(0);
            let next = current
                .checked_add(delta)
                .filter(|next| *next <= max)
                .ok_or_else(|| StoreError::OutOfRange {
                    path: path.to_string(),
                    field: field.to_owned(),
                    max,
                })?;

            docs.entry(path.id().to_owned())
                .or_insert(seed)
                .insert(field.to_owned(), Value::from(next));
            Ok(true)
        })
        .await
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        self.write(path, |docs| Ok(docs.remove(path.id()).is_some()))
            .await
    }

    async fn watch(&self, collection: &CollectionPath) -> Result<CollectionWatch, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.lock().await;
        let entry = collections
            .entry(collection.clone())
            .or_insert_with(Collection::new);
        Ok(entry.changes.subscribe())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check_available()
    }
}
