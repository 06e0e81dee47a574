//! Store error types.

use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot be reached.
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Running schema migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The document does not exist (only for operations that require it to).
    #[error("document not found: {0}")]
    NotFound(String),

    /// An insert-only write found an existing document.
    #[error("document already exists: {0}")]
    AlreadyExists(String),

    /// A collection or document path is malformed.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// A document did not match the expected shape.
    #[error("document at {path} is malformed: {source}")]
    Decode {
        /// Path of the offending document.
        path: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },

    /// An increment would push a field past its allowed maximum. Nothing was
    /// written.
    #[error("{field} at {path} would exceed {max}")]
    OutOfRange {
        path: String,
        field: String,
        max: i64,
    },

    /// A conditional update found `field` holding something other than the
    /// expected value. Nothing was written.
    #[error("{field} at {path} changed concurrently")]
    Precondition { path: String, field: String },

    /// A value could not be serialized into a document body.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this error means the backend itself is unreachable, as opposed
    /// to a problem with one request.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Database(err) => matches!(
                err,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            ),
            _ => false,
        }
    }
}
