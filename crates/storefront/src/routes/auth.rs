//! Authentication route handlers.
//!
//! Registration and sign-in go through the identity provider; the resulting
//! identity is kept in the session.

use axum::{Json, extract::State, http::StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use atelier_core::Identity;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
use crate::state::AppState;

/// Credentials for registration and sign-in.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// `POST /auth/register`
#[instrument(skip(state, session, credentials))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<Identity>)> {
    let identity = state
        .identity()
        .register(&credentials.email, credentials.password.expose_secret())
        .await?;

    set_current_user(&session, &identity).await?;
    set_sentry_user(&identity.uid, Some(identity.email.as_str()));
    tracing::info!(uid = %identity.uid, "User registered");

    Ok((StatusCode::CREATED, Json(identity)))
}

/// `POST /auth/login`
#[instrument(skip(state, session, credentials))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Identity>> {
    let identity = state
        .identity()
        .sign_in(&credentials.email, credentials.password.expose_secret())
        .await?;

    set_current_user(&session, &identity).await?;
    set_sentry_user(&identity.uid, Some(identity.email.as_str()));
    tracing::info!(uid = %identity.uid, "User signed in");

    Ok(Json(identity))
}

/// `POST /auth/logout`
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    session: Session,
) -> Result<StatusCode> {
    if let Some(identity) = identity {
        state.carts().forget(&identity.uid).await;
        tracing::info!(uid = %identity.uid, "User signed out");
    }
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /auth/me`
pub async fn me(RequireAuth(identity): RequireAuth) -> Json<Identity> {
    Json(identity)
}
