//! `PostgreSQL` document store.
//!
//! # Schema
//!
//! One `documents` table keyed by `(collection, id)` with a JSONB body. A row
//! trigger publishes the collection path on the `document_changes` channel,
//! which drives live subscriptions.
//!
//! # Migrations
//!
//! Stored in `crates/store/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sqlx::PgPool;
use sqlx::postgres::{PgListener, PgPoolOptions};
use tokio::sync::{Mutex, watch};

use crate::document::{CollectionWatch, Document, DocumentStore, Fields};
use crate::error::StoreError;
use crate::path::{CollectionPath, DocumentPath};

/// Channel the change trigger notifies on.
const CHANGE_CHANNEL: &str = "document_changes";

type Subscribers = Arc<Mutex<HashMap<CollectionPath, watch::Sender<Vec<Document>>>>>;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the document schema migrations.
///
/// # Errors
///
/// Returns `StoreError::Migration` if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Document store backed by the `documents` table.
pub struct PgDocumentStore {
    pool: PgPool,
    subscribers: Subscribers,
}

impl PgDocumentStore {
    /// Create the store and start the change listener.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if the listener cannot connect.
    pub async fn start(pool: PgPool) -> Result<Self, StoreError> {
        let subscribers: Subscribers = Arc::default();
        let mut listener = PgListener::connect_with(&pool).await?;
        listener.listen(CHANGE_CHANNEL).await?;

        tokio::spawn(listen_for_changes(
            listener,
            pool.clone(),
            Arc::clone(&subscribers),
        ));

        Ok(Self { pool, subscribers })
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn fetch_collection(pool: &PgPool, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
    let rows: Vec<(String, Value)> = sqlx::query_as(
        r"
        SELECT id, data FROM documents
        WHERE collection = $1
        ORDER BY id
        ",
    )
    .bind(collection.as_str())
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(id, data)| match data {
            Value::Object(data) => Ok(Document { id, data }),
            _ => Err(StoreError::InvalidPath(format!(
                "{collection}/{id} is not a JSON object"
            ))),
        })
        .collect()
}

/// Refresh one subscribed collection, dropping it if nobody is listening.
async fn refresh(pool: &PgPool, subscribers: &Subscribers, collection: &CollectionPath) {
    let mut subs = subscribers.lock().await;
    let Some(sender) = subs.get(collection) else {
        return;
    };
    if sender.receiver_count() == 0 {
        subs.remove(collection);
        return;
    }
    match fetch_collection(pool, collection).await {
        Ok(docs) => {
            sender.send_replace(docs);
        }
        Err(e) => {
            tracing::warn!(collection = %collection, error = %e, "Failed to refresh subscription");
        }
    }
}

async fn listen_for_changes(mut listener: PgListener, pool: PgPool, subscribers: Subscribers) {
    loop {
        match listener.try_recv().await {
            Ok(Some(notification)) => {
                let Ok(collection) = CollectionPath::parse(notification.payload()) else {
                    tracing::warn!(payload = notification.payload(), "Ignoring malformed change notification");
                    continue;
                };
                refresh(&pool, &subscribers, &collection).await;
            }
            Ok(None) => {
                // Connection was lost and re-established; notifications in
                // between are gone, so resync every subscription.
                tracing::warn!("Change listener reconnected, resyncing subscriptions");
                let watched: Vec<CollectionPath> =
                    subscribers.lock().await.keys().cloned().collect();
                for collection in &watched {
                    refresh(&pool, &subscribers, collection).await;
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Change listener failed, retrying");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        let data: Option<Value> = sqlx::query_scalar(
            r"
            SELECT data FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(path.collection().as_str())
        .bind(path.id())
        .fetch_optional(&self.pool)
        .await?;

        Ok(data.and_then(|data| match data {
            Value::Object(data) => Some(Document {
                id: path.id().to_owned(),
                data,
            }),
            _ => None,
        }))
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        fetch_collection(&self.pool, collection).await
    }

    async fn set(&self, path: &DocumentPath, data: Fields) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            ",
        )
        .bind(path.collection().as_str())
        .bind(path.id())
        .bind(Value::Object(data))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert(&self, path: &DocumentPath, data: Fields) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id) DO NOTHING
            ",
        )
        .bind(path.collection().as_str())
        .bind(path.id())
        .bind(Value::Object(data))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(path.to_string()));
        }
        Ok(())
    }

    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(path.collection().as_str())
        .bind(path.id())
        .bind(Value::Object(fields))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(path.to_string()));
        }
        Ok(())
    }

    async fn update_if(
        &self,
        path: &DocumentPath,
        field: &str,
        expected: &Value,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2 AND data -> $4 = $5
            ",
        )
        .bind(path.collection().as_str())
        .bind(path.id())
        .bind(Value::Object(fields))
        .bind(field)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get(path).await? {
                Some(_) => Err(StoreError::Precondition {
                    path: path.to_string(),
                    field: field.to_owned(),
                }),
                None => Err(StoreError::NotFound(path.to_string())),
            };
        }
        Ok(())
    }

    async fn increment(
        &self,
        path: &DocumentPath,
        field: &str,
        delta: i64,
        max: i64,
        seed: Fields,
    ) -> Result<(), StoreError> {
        let out_of_range = || StoreError::OutOfRange {
            path: path.to_string(),
            field: field.to_owned(),
            max,
        };
        if delta > max {
            return Err(out_of_range());
        }

        // The conflict branch holds the row lock, so concurrent increments
        // serialize instead of overwriting each other. The WHERE clause skips
        // the update when the sum would pass `max`, leaving zero rows affected.
        let result = sqlx::query(
            r"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, jsonb_set($3, ARRAY[$4::text], to_jsonb($5::bigint)))
            ON CONFLICT (collection, id) DO UPDATE SET
                data = jsonb_set(
                    documents.data,
                    ARRAY[$4::text],
                    to_jsonb(
                        COALESCE(
                            CASE WHEN jsonb_typeof(documents.data -> $4::text) = 'number'
                                 THEN (documents.data ->> $4::text)::bigint
                            END,
                            0
                        ) + $5::bigint
                    )
                ),
                updated_at = NOW()
            WHERE COALESCE(
                    CASE WHEN jsonb_typeof(documents.data -> $4::text) = 'number'
                         THEN (documents.data ->> $4::text)::numeric
                    END,
                    0
                ) + $5::numeric <= $6::numeric
            ",
        )
        .bind(path.collection().as_str())
        .bind(path.id())
        .bind(Value::Object(seed))
        .bind(field)
        .bind(delta)
        .bind(max)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(out_of_range());
        }
        Ok(())
    }

    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError> {
        sqlx::query(
            r"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(path.collection().as_str())
        .bind(path.id())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn watch(&self, collection: &CollectionPath) -> Result<CollectionWatch, StoreError> {
        let mut subs = self.subscribers.lock().await;
        if let Some(sender) = subs.get(collection) {
            return Ok(sender.subscribe());
        }

        let docs = fetch_collection(&self.pool, collection).await?;
        let (sender, receiver) = watch::channel(docs);
        subs.insert(collection.clone(), sender);
        Ok(receiver)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
