//! Cart route handlers.
//!
//! Every mutation awaits its remote write before answering, so a failed write
//! reaches the client as 502. The returned snapshot is the live view at that
//! moment.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use atelier_core::{CartItemId, CartSnapshot, Product, ProductId};
use atelier_store::paths;

use crate::cart::CartError;
use crate::error::{AppError, Result};
use crate::middleware::OptionalAuth;
use crate::state::AppState;

/// Body of `POST /cart/items`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    pub size: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Variant color; absent selects the base product.
    pub color: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

/// Body of `PATCH /cart/items/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// `GET /cart`
///
/// Guests see an empty cart.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
) -> Result<Json<CartSnapshot>> {
    let cart = state.carts().cart_for(identity.as_ref()).await?;
    Ok(Json(cart.snapshot()))
}

/// `POST /cart/items`
#[instrument(skip_all, fields(product_id = %request.product_id))]
pub async fn add(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartSnapshot>> {
    let cart = state.carts().cart_for(identity.as_ref()).await?;
    if cart.identity().is_none() {
        return Err(CartError::LoginRequired.into());
    }

    let path = paths::product(&ProductId::new(request.product_id))?;
    let product: Product = state
        .store()
        .get(&path)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    if !product.sizes.is_empty() && !product.has_size(&request.size) {
        return Err(AppError::invalid("size", "Select an available size"));
    }

    let variant = match request.color.as_deref() {
        Some(color) => Some(
            product
                .variant_by_color(color)
                .ok_or_else(|| AppError::invalid("color", "Select an available color"))?,
        ),
        None => None,
    };

    cart.add_item(&product, &request.size, request.quantity, variant)?
        .await?;
    Ok(Json(cart.snapshot()))
}

/// `PATCH /cart/items/{id}`
#[instrument(skip(state, identity, request))]
pub async fn update(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartSnapshot>> {
    let cart = state.carts().cart_for(identity.as_ref()).await?;
    cart.update_quantity(&CartItemId::new(id), request.quantity)?
        .await?;
    Ok(Json(cart.snapshot()))
}

/// `DELETE /cart/items/{id}`
#[instrument(skip(state, identity))]
pub async fn remove(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    Path(id): Path<String>,
) -> Result<Json<CartSnapshot>> {
    let cart = state.carts().cart_for(identity.as_ref()).await?;
    cart.remove_item(&CartItemId::new(id))?.await?;
    Ok(Json(cart.snapshot()))
}

/// `DELETE /cart`
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
) -> Result<Json<CartSnapshot>> {
    let cart = state.carts().cart_for(identity.as_ref()).await?;
    cart.clear_cart()?.await?;
    Ok(Json(cart.snapshot()))
}
