//! Admin role commands.
//!
//! # Usage
//!
//! ```bash
//! atelier role grant -e ada@example.com -r super_admin
//! atelier role revoke -e ada@example.com
//! ```
//!
//! The user must already exist; see `atelier user create`.

use atelier_core::{AdminRole, Email, UserId};
use atelier_store::{AuthError, IdentityProvider, Store};

use super::CliError;

async fn resolve(store: &Store, email: &str) -> Result<UserId, CliError> {
    let email = Email::parse(email).map_err(AuthError::from)?;
    IdentityProvider::new(store.clone())
        .find_by_email(&email)
        .await?
        .map(|(uid, _)| uid)
        .ok_or_else(|| CliError::UnknownUser(email.to_string()))
}

/// Give the user with `email` an admin role.
pub async fn grant(store: &Store, email: &str, role: AdminRole) -> Result<UserId, CliError> {
    let uid = resolve(store, email).await?;
    atelier_store::grant_role(store, &uid, role).await?;
    tracing::info!(%uid, %role, "Role granted");
    Ok(uid)
}

/// Remove the admin role of the user with `email`.
pub async fn revoke(store: &Store, email: &str) -> Result<UserId, CliError> {
    let uid = resolve(store, email).await?;
    atelier_store::revoke_role(store, &uid).await?;
    tracing::info!(%uid, "Role revoked");
    Ok(uid)
}

/// `atelier role grant`
pub async fn run_grant(email: &str, role: AdminRole) -> Result<(), CliError> {
    let connected = super::connect().await?;
    grant(&connected.store, email, role).await?;
    Ok(())
}

/// `atelier role revoke`
pub async fn run_revoke(email: &str) -> Result<(), CliError> {
    let connected = super::connect().await?;
    revoke(&connected.store, email).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use atelier_store::{Connected, get_role};

    use super::*;
    use crate::commands::users;

    #[tokio::test]
    async fn test_grant_then_revoke() {
        let connected = Connected::memory();
        let store = &connected.store;
        users::create(store, "ada@example.com", "correct horse battery")
            .await
            .unwrap();

        let uid = grant(store, "ada@example.com", AdminRole::Viewer)
            .await
            .unwrap();
        assert_eq!(get_role(store, &uid).await.unwrap(), Some(AdminRole::Viewer));

        revoke(store, "ada@example.com").await.unwrap();
        assert_eq!(get_role(store, &uid).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_grant_to_unknown_user_fails() {
        let connected = Connected::memory();
        let err = grant(&connected.store, "ghost@example.com", AdminRole::Admin)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::UnknownUser(email) if email == "ghost@example.com"));
    }
}
