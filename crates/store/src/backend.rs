//! Backend selection.

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;

use crate::document::Store;
use crate::error::StoreError;
use crate::memory::MemoryStore;
use crate::postgres::{PgDocumentStore, create_pool};

/// Which backend a [`Store`] was connected to.
///
/// Binaries use this to pick a matching session store.
#[derive(Clone)]
pub enum Backend {
    /// In-process store. The handle allows fault injection in tests.
    Memory(Arc<MemoryStore>),
    /// `PostgreSQL` pool shared with the document store.
    Postgres(PgPool),
}

/// A connected store and the backend behind it.
#[derive(Clone)]
pub struct Connected {
    pub store: Store,
    pub backend: Backend,
}

impl Connected {
    /// An empty in-memory store.
    #[must_use]
    pub fn memory() -> Self {
        let memory = Arc::new(MemoryStore::new());
        Self {
            store: Store::from_arc(Arc::clone(&memory) as Arc<dyn crate::document::DocumentStore>),
            backend: Backend::Memory(memory),
        }
    }
}

/// Connect to `PostgreSQL` when a database URL is given, otherwise fall back
/// to an in-memory store.
///
/// # Errors
///
/// Returns `StoreError::Database` if the database cannot be reached.
pub async fn connect(database_url: Option<&SecretString>) -> Result<Connected, StoreError> {
    let Some(url) = database_url else {
        tracing::warn!("DATABASE_URL not set, using in-memory document store");
        return Ok(Connected::memory());
    };

    let pool = create_pool(url).await?;
    let store = PgDocumentStore::start(pool.clone()).await?;
    tracing::info!("Connected to PostgreSQL document store");

    Ok(Connected {
        store: Store::new(store),
        backend: Backend::Postgres(pool),
    })
}
