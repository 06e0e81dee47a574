//! Authentication extractors.
//!
//! The signed-in [`Identity`] lives in the session under
//! [`session_keys::CURRENT_USER`].

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use atelier_core::Identity;

use crate::error::AppError;
use crate::models::session_keys;

/// Extractor that requires a signed-in user.
///
/// Rejects with 401 "Please log in to continue" otherwise.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireAuth(identity): RequireAuth) -> impl IntoResponse {
///     format!("Orders for {}", identity.email)
/// }
/// ```
pub struct RequireAuth(pub Identity);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_identity(parts)
            .await
            .map(Self)
            .ok_or(AppError::Unauthorized)
    }
}

/// Extractor that optionally gets the signed-in user.
///
/// Unlike `RequireAuth`, this never rejects the request.
pub struct OptionalAuth(pub Option<Identity>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(current_identity(parts).await))
    }
}

async fn current_identity(parts: &Parts) -> Option<Identity> {
    // Set by SessionManagerLayer
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<Identity>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Store the signed-in identity in the session.
///
/// The session id is cycled first so a pre-login session id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    identity: &Identity,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, identity).await
}

/// Sign out by dropping all session data.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
