//! Admin sign-in and sign-out.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use atelier_store::get_role;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAdmin, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

/// `POST /auth/login`
///
/// Users without a role document are refused before a session is created.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<CurrentAdmin>> {
    let identity = state
        .identity()
        .sign_in(&request.email, request.password.expose_secret())
        .await?;

    let Some(role) = get_role(state.store(), &identity.uid).await? else {
        tracing::warn!(uid = %identity.uid, "Sign-in refused: no admin role");
        return Err(AppError::Forbidden("admin role required".to_string()));
    };

    set_current_admin(&session, &identity).await?;
    set_sentry_user(&identity.uid, Some(identity.email.as_str()));
    tracing::info!(uid = %identity.uid, %role, "Admin signed in");

    Ok(Json(CurrentAdmin { identity, role }))
}

/// `POST /auth/logout`
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<StatusCode> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/me`
pub async fn me(RequireAdmin(admin): RequireAdmin) -> Json<CurrentAdmin> {
    Json(admin)
}
