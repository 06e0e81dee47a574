//! The document store abstraction and its typed wrapper.
//!
//! [`DocumentStore`] is the seam between the application and a backend
//! ([`MemoryStore`](crate::MemoryStore) or [`PgDocumentStore`](crate::PgDocumentStore)).
//! Application code uses [`Store`], which adds serde-typed helpers on top.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::StoreError;
use crate::path::{CollectionPath, DocumentPath};

/// The body of a document: a JSON object.
pub type Fields = Map<String, Value>;

/// Live view of a collection.
///
/// The receiver always holds the full, id-ordered contents of the collection
/// and is notified after every change. Dropping it ends the subscription.
pub type CollectionWatch = watch::Receiver<Vec<Document>>;

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document id within its collection.
    pub id: String,
    /// Document body.
    pub data: Fields,
}

impl Document {
    /// Decode the body into `T`, exposing the document id as its `id` field.
    ///
    /// The path id always wins over an `id` stored in the body.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let mut data = self.data.clone();
        data.insert("id".to_owned(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(data))
    }
}

/// Serialize a value into a document body.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if `value` does not serialize to a JSON
/// object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(serde::ser::Error::custom(
            format!("expected a JSON object, got {other}"),
        ))),
    }
}

/// A document database backend.
///
/// Writes follow last-writer-wins at document granularity. The only
/// read-modify-write primitive is [`DocumentStore::increment`], which the
/// backend performs atomically.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Fetch a single document.
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError>;

    /// Fetch every document in a collection, ordered by id.
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError>;

    /// Create or overwrite a document.
    async fn set(&self, path: &DocumentPath, data: Fields) -> Result<(), StoreError>;

    /// Create a document, failing with `AlreadyExists` if it is present.
    async fn insert(&self, path: &DocumentPath, data: Fields) -> Result<(), StoreError>;

    /// Shallow-merge fields into an existing document, failing with
    /// `NotFound` if it is absent.
    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError>;

    /// Shallow-merge `fields` only while `field` still equals `expected`.
    ///
    /// Fails with `NotFound` if the document is absent and with
    /// `StoreError::Precondition` if the field holds anything else.
    async fn update_if(
        &self,
        path: &DocumentPath,
        field: &str,
        expected: &Value,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Atomically add `delta` to the integer `field`.
    ///
    /// If the document is absent it is created from `seed` with `field` set to
    /// `delta`. A missing or non-integer field counts as zero. When the result
    /// would exceed `max` the document is left untouched and
    /// `StoreError::OutOfRange` is returned.
    async fn increment(
        &self,
        path: &DocumentPath,
        field: &str,
        delta: i64,
        max: i64,
        seed: Fields,
    ) -> Result<(), StoreError>;

    /// Delete a document. Deleting an absent document succeeds.
    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError>;

    /// Subscribe to a collection.
    async fn watch(&self, collection: &CollectionPath) -> Result<CollectionWatch, StoreError>;

    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Cheaply cloneable handle to a document store with typed helpers.
#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn DocumentStore>,
}

impl Store {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: impl DocumentStore) -> Self {
        Self {
            inner: Arc::new(backend),
        }
    }

    /// Wrap an already shared backend.
    #[must_use]
    pub fn from_arc(backend: Arc<dyn DocumentStore>) -> Self {
        Self { inner: backend }
    }

    /// Access the untyped backend.
    #[must_use]
    pub fn raw(&self) -> &dyn DocumentStore {
        self.inner.as_ref()
    }

    /// Fetch and decode a document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Decode` if the document does not match `T`, or the
    /// backend's error.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &DocumentPath,
    ) -> Result<Option<T>, StoreError> {
        match self.inner.get(path).await? {
            Some(doc) => doc.decode().map(Some).map_err(|source| StoreError::Decode {
                path: path.to_string(),
                source,
            }),
            None => Ok(None),
        }
    }

    /// Fetch and decode every document in a collection.
    ///
    /// Documents that fail to decode are skipped with a warning, so one bad
    /// record does not hide the rest of the collection.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &CollectionPath,
    ) -> Result<Vec<T>, StoreError> {
        let docs = self.inner.list(collection).await?;
        Ok(decode_all(collection, &docs))
    }

    /// Serialize and store a value, overwriting any existing document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` or the backend's error.
    pub async fn put<T: Serialize + Sync>(
        &self,
        path: &DocumentPath,
        value: &T,
    ) -> Result<(), StoreError> {
        self.inner.set(path, to_fields(value)?).await
    }

    /// Serialize and store a value only if no document exists at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists`, `StoreError::Serialization`, or the
    /// backend's error.
    pub async fn insert<T: Serialize + Sync>(
        &self,
        path: &DocumentPath,
        value: &T,
    ) -> Result<(), StoreError> {
        self.inner.insert(path, to_fields(value)?).await
    }

    /// Store a value under a freshly generated id and return its path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` or the backend's error.
    pub async fn create<T: Serialize + Sync>(
        &self,
        collection: &CollectionPath,
        value: &T,
    ) -> Result<DocumentPath, StoreError> {
        let path = collection.doc(&Uuid::new_v4().to_string())?;
        self.insert(&path, value).await?;
        Ok(path)
    }

    /// Shallow-merge fields into an existing document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the document is absent, or the
    /// backend's error.
    pub async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        self.inner.update(path, fields).await
    }

    /// Merge fields into an existing document if `field` still holds
    /// `expected`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the document is absent,
    /// `StoreError::Precondition` if the field has changed, or the backend's
    /// error.
    pub async fn update_if<T: Serialize + Sync>(
        &self,
        path: &DocumentPath,
        field: &str,
        expected: &T,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let expected = serde_json::to_value(expected)?;
        self.inner.update_if(path, field, &expected, fields).await
    }

    /// Atomically add `delta` to an integer field, creating the document from
    /// `seed` if needed. The sum may not exceed `max`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::OutOfRange` when the sum would exceed `max`,
    /// `StoreError::Serialization`, or the backend's error.
    pub async fn increment<T: Serialize + Sync>(
        &self,
        path: &DocumentPath,
        field: &str,
        delta: i64,
        max: i64,
        seed: &T,
    ) -> Result<(), StoreError> {
        self.inner
            .increment(path, field, delta, max, to_fields(seed)?)
            .await
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        self.inner.delete(path).await
    }

    /// Subscribe to a collection.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn watch(&self, collection: &CollectionPath) -> Result<CollectionWatch, StoreError> {
        self.inner.watch(collection).await
    }

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}

/// Decode a batch of documents, skipping and logging malformed ones.
#[must_use]
pub fn decode_all<T: DeserializeOwned>(collection: &CollectionPath, docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match doc.decode() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    collection = %collection,
                    id = %doc.id,
                    error = %e,
                    "Skipping malformed document"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        id: String,
        name: String,
    }

    fn doc(id: &str, value: Value) -> Document {
        Document {
            id: id.to_string(),
            data: value.as_object().cloned().unwrap(),
        }
    }

    #[test]
    fn test_decode_injects_document_id() {
        let named: Named = doc("p1", json!({ "name": "Tee" })).decode().unwrap();
        assert_eq!(
            named,
            Named {
                id: "p1".to_string(),
                name: "Tee".to_string()
            }
        );
    }

    #[test]
    fn test_decode_prefers_path_id_over_body_id() {
        let named: Named = doc("p1", json!({ "id": "other", "name": "Tee" }))
            .decode()
            .unwrap();
        assert_eq!(named.id, "p1");

        let blank: Named = doc("p2", json!({ "id": "", "name": "Tee" }))
            .decode()
            .unwrap();
        assert_eq!(blank.id, "p2");
    }

    #[test]
    fn test_to_fields_rejects_non_objects() {
        assert!(to_fields(&json!({ "a": 1 })).is_ok());
        assert!(matches!(
            to_fields(&42),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_decode_all_skips_malformed() {
        let collection = CollectionPath::parse("products").unwrap();
        let docs = vec![
            doc("a", json!({ "name": "A" })),
            doc("b", json!({ "name": 7 })),
            doc("c", json!({ "name": "C" })),
        ];
        let named: Vec<Named> = decode_all(&collection, &docs);
        assert_eq!(named.len(), 2);
        assert_eq!(named[1].id, "c");
    }
}
