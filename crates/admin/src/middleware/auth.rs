//! Authentication extractors for admin.
//!
//! Every admin route needs a signed-in identity that holds a role document.
//! Read routes take [`RequireAdmin`]; routes that change data take
//! [`RequireWriter`], which rejects the `viewer` role.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use atelier_core::Identity;
use atelier_store::get_role;

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in admin of any role.
///
/// # Example
///
/// ```rust,ignore
/// async fn dashboard(RequireAdmin(admin): RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.identity.email)
/// }
/// ```
pub struct RequireAdmin(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AppError::Unauthorized)?;

        let identity: Identity = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AppError::Unauthorized)?;

        let role = get_role(state.store(), &identity.uid)
            .await?
            .ok_or_else(|| AppError::Forbidden("admin role required".to_string()))?;

        Ok(Self(CurrentAdmin { identity, role }))
    }
}

/// Extractor that requires an admin whose role may write.
pub struct RequireWriter(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireWriter {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdmin(admin) = RequireAdmin::from_request_parts(parts, state).await?;
        if !admin.role.can_write() {
            return Err(AppError::Forbidden(format!(
                "role {} is read-only",
                admin.role
            )));
        }
        Ok(Self(admin))
    }
}

/// Store the signed-in admin identity in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    identity: &Identity,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, identity).await
}

/// Clear the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
