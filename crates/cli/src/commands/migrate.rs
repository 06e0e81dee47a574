//! Database migration commands.
//!
//! # Usage
//!
//! ```bash
//! atelier migrate
//! ```
//!
//! Creates the `documents` table with its change-notification trigger, then
//! the session table used by both web services.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string for the document store

use tower_sessions_sqlx_store::PostgresStore;

use super::{CliError, database_url};

/// Run all migrations against `DATABASE_URL`.
pub async fn run() -> Result<(), CliError> {
    let url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = atelier_store::create_pool(&url).await?;

    tracing::info!("Running document store migrations...");
    atelier_store::migrate(&pool).await?;

    tracing::info!("Running session store migrations...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
