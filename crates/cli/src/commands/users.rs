//! User account commands.
//!
//! # Usage
//!
//! ```bash
//! atelier user create -e ada@example.com -p 'correct horse battery'
//! ```

use atelier_core::Identity;
use atelier_store::{IdentityProvider, Store};

use super::CliError;

/// Register an account in `store`.
pub async fn create(store: &Store, email: &str, password: &str) -> Result<Identity, CliError> {
    let identity = IdentityProvider::new(store.clone())
        .register(email, password)
        .await?;
    tracing::info!(uid = %identity.uid, email = %identity.email, "User created");
    Ok(identity)
}

/// `atelier user create`
pub async fn run_create(email: &str, password: &str) -> Result<(), CliError> {
    let connected = super::connect().await?;
    create(&connected.store, email, password).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_store::{AuthError, Connected};

    use super::*;

    #[tokio::test]
    async fn test_create_rejects_duplicate_email() {
        let connected = Connected::memory();
        create(&connected.store, "ada@example.com", "correct horse battery")
            .await
            .unwrap();

        let err = create(&connected.store, "ADA@example.com", "another password")
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Auth(AuthError::UserAlreadyExists)));
    }
}
