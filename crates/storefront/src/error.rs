//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Every response body is JSON:
//!
//! - validation failures: `422 {"errors": {field: message}}`
//! - everything else: `{"error": message}`

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use atelier_core::FieldErrors;
use atelier_store::{AuthError, StoreError};

use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::suggestions::SuggestionError;

/// Message shown when the user has to sign in first.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to continue";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Registration or sign-in failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Outfit suggestion failed.
    #[error("Suggestion error: {0}")]
    Suggestion(#[from] SuggestionError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Request fields are invalid.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// A single-field validation error.
    #[must_use]
    pub fn invalid(field: &str, message: &str) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        Self::Validation(errors)
    }
}

fn store_status(err: &StoreError) -> StatusCode {
    if err.is_unavailable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn error_body(message: &str) -> serde_json::Value {
    json!({ "error": message })
}

fn field_body(field: &str, message: &str) -> serde_json::Value {
    json!({ "errors": { field: message } })
}

impl IntoResponse for AppError {
    #[allow(clippy::too_many_lines)]
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Store(err) | Self::Auth(AuthError::Store(err)) => {
                let status = store_status(err);
                let message = if status == StatusCode::SERVICE_UNAVAILABLE {
                    "Service temporarily unavailable"
                } else {
                    "Internal server error"
                };
                (status, error_body(message))
            }
            Self::Auth(err) => match err {
                AuthError::InvalidEmail(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    field_body("email", "Enter a valid email address"),
                ),
                AuthError::WeakPassword(msg) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, field_body("password", msg))
                }
                AuthError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, error_body("Invalid credentials"))
                }
                AuthError::UserAlreadyExists => (
                    StatusCode::CONFLICT,
                    error_body("An account with this email already exists"),
                ),
                AuthError::PasswordHash | AuthError::Store(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("Authentication error"),
                ),
            },
            Self::Cart(err) => match err {
                CartError::LoginRequired => {
                    (StatusCode::UNAUTHORIZED, error_body(LOGIN_REQUIRED_MESSAGE))
                }
                CartError::InvalidQuantity => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    field_body("quantity", "Quantity must be at least 1"),
                ),
                CartError::QuantityTooLarge { max } => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    field_body("quantity", &format!("Quantity may not exceed {max}")),
                ),
                CartError::Store(StoreError::NotFound(_)) => {
                    (StatusCode::NOT_FOUND, error_body("Cart item not found"))
                }
                CartError::Store(_) | CartError::PartialClear { .. } => (
                    StatusCode::BAD_GATEWAY,
                    error_body("Could not update your cart, please try again"),
                ),
                CartError::Aborted(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("Internal server error"),
                ),
            },
            Self::Checkout(err) => match err {
                CheckoutError::Validation(errors) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "errors": errors }),
                ),
                CheckoutError::EmptyCart => (
                    StatusCode::CONFLICT,
                    json!({ "state": "cart_empty", "redirect": "/cart" }),
                ),
                CheckoutError::Store(err) => {
                    let status = if err.is_unavailable() {
                        StatusCode::SERVICE_UNAVAILABLE
                    } else {
                        StatusCode::BAD_GATEWAY
                    };
                    (status, error_body("Could not place your order, please try again"))
                }
            },
            Self::Suggestion(err) => match err {
                SuggestionError::EmptyPrompt => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    field_body("stylePrompt", "Describe the style you are looking for"),
                ),
                SuggestionError::NoMatches => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    error_body("No matching products found for this style"),
                ),
                SuggestionError::Unavailable => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    error_body("Outfit suggestions are unavailable"),
                ),
                SuggestionError::InvalidResponse(_) | SuggestionError::Model(_) => (
                    StatusCode::BAD_GATEWAY,
                    error_body("Could not get suggestions, please try again"),
                ),
            },
            Self::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "errors": errors }),
            ),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, error_body(&format!("{what} not found"))),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, error_body(LOGIN_REQUIRED_MESSAGE)),
            Self::Session(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("Internal server error"),
            ),
        };

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}
