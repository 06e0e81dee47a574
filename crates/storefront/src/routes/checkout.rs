//! Checkout route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::instrument;

use atelier_core::{CartSnapshot, Order};

use crate::checkout::{CheckoutError, CheckoutForm, place_order};
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Checkout page state for a non-empty cart.
#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub state: &'static str,
    pub cart: CartSnapshot,
}

/// `GET /checkout`
///
/// An empty cart answers 409 with `{"state": "cart_empty", "redirect": "/cart"}`.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
) -> Result<Json<CheckoutView>> {
    let cart = state.carts().cart_for(identity.as_ref()).await?;
    let snapshot = cart.snapshot();
    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart.into());
    }
    Ok(Json(CheckoutView {
        state: "ready",
        cart: snapshot,
    }))
}

/// `POST /checkout`
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, Json<Order>)> {
    let cart = state.carts().cart_for(identity.as_ref()).await?;
    let order = place_order(state.store(), &cart, &form).await?;
    Ok((StatusCode::CREATED, Json(order)))
}
