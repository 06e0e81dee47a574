//! Identity provider.
//!
//! Email + password accounts kept in the document store:
//!
//! - `users/{uid}` holds the email, an Argon2id hash and the creation time.
//! - `user_emails/{email}` maps a normalized email to its uid. It is written
//!   with an insert-only operation, which is what makes emails unique.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use atelier_core::{Email, Identity, UserId};

use crate::document::Store;
use crate::error::StoreError;
use crate::path::paths;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Stored account document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub email: Email,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EmailIndex {
    uid: UserId,
}

/// Registers and signs in users.
#[derive(Clone)]
pub struct IdentityProvider {
    store: Store,
}

impl IdentityProvider {
    /// Create a provider over the given store.
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a new user with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let uid = UserId::new(Uuid::new_v4().to_string());

        // Claim the email first; a concurrent registration loses here.
        self.store
            .insert(&paths::user_email(&email)?, &EmailIndex { uid: uid.clone() })
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists(_) => AuthError::UserAlreadyExists,
                other => AuthError::Store(other),
            })?;

        let account = UserAccount {
            email: email.clone(),
            password_hash,
            created_at: Utc::now(),
        };
        if let Err(e) = self.store.put(&paths::user(&uid)?, &account).await {
            // Release the claim so the email can be registered again.
            if let Err(cleanup) = self.store.delete(&paths::user_email(&email)?).await {
                tracing::warn!(error = %cleanup, "Failed to release email claim");
            }
            return Err(e.into());
        }

        tracing::info!(uid = %uid, "User registered");
        Ok(Identity { uid, email })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = Email::parse(email)?;

        let (uid, account) = self
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &account.password_hash)?;

        Ok(Identity {
            uid,
            email: account.email,
        })
    }

    /// Look up an account by uid.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the store cannot be read.
    pub async fn get(&self, uid: &UserId) -> Result<Option<UserAccount>, AuthError> {
        Ok(self.store.get(&paths::user(uid)?).await?)
    }

    /// Look up an account by email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Store` if the store cannot be read.
    pub async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(UserId, UserAccount)>, AuthError> {
        let Some(index) = self
            .store
            .get::<EmailIndex>(&paths::user_email(email)?)
            .await?
        else {
            return Ok(None);
        };

        Ok(self
            .get(&index.uid)
            .await?
            .map(|account| (index.uid, account)))
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
