//! Subcommand implementations.

pub mod migrate;
pub mod roles;
pub mod seed;
pub mod users;

use atelier_core::FieldErrors;
use atelier_store::{AuthError, Connected, StoreError};
use secrecy::SecretString;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A seed record failed validation.
    #[error("Invalid {kind} '{name}': {errors}")]
    Invalid {
        kind: &'static str,
        name: String,
        errors: FieldErrors,
    },

    #[error("No user with email {0}")]
    UnknownUser(String),
}

/// Read `DATABASE_URL`; every command needs the shared Postgres store.
pub fn database_url() -> Result<SecretString, CliError> {
    std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("DATABASE_URL"))
}

/// Connect to the document store behind `DATABASE_URL`.
pub async fn connect() -> Result<Connected, CliError> {
    let url = database_url()?;
    tracing::info!("Connecting to document store...");
    Ok(atelier_store::connect(Some(&url)).await?)
}
