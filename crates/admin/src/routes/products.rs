//! Product management.
//!
//! Products are validated before every write. The document id is the path
//! segment; any `id` in a request body is overwritten with it.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use atelier_core::{Product, ProductId};
use atelier_store::paths;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireWriter};
use crate::state::AppState;

/// `GET /products`
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Product>>> {
    let mut products: Vec<Product> = state.store().list(&paths::products()).await?;
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(products))
}

/// `GET /products/{id}`
#[instrument(skip(state, _admin))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    state
        .store()
        .get(&paths::product(&ProductId::new(id))?)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// `POST /products`
#[instrument(skip_all, fields(admin = %admin.identity.uid))]
pub async fn create(
    State(state): State<AppState>,
    RequireWriter(admin): RequireWriter,
    Json(mut product): Json<Product>,
) -> Result<(StatusCode, Json<Product>)> {
    product.validate()?;

    product.id = ProductId::new(Uuid::new_v4().to_string());
    state
        .store()
        .insert(&paths::product(&product.id)?, &product)
        .await?;

    tracing::info!(product_id = %product.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}`
#[instrument(skip(state, admin, product), fields(admin = %admin.identity.uid))]
pub async fn update(
    State(state): State<AppState>,
    RequireWriter(admin): RequireWriter,
    Path(id): Path<String>,
    Json(mut product): Json<Product>,
) -> Result<Json<Product>> {
    product.id = ProductId::new(id);
    product.validate()?;

    let path = paths::product(&product.id)?;
    if state.store().get::<Product>(&path).await?.is_none() {
        return Err(AppError::NotFound("Product".to_string()));
    }
    state.store().put(&path, &product).await?;

    tracing::info!(product_id = %product.id, "Product updated");
    Ok(Json(product))
}

/// `DELETE /products/{id}`
#[instrument(skip(state, admin), fields(admin = %admin.identity.uid))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireWriter(admin): RequireWriter,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state
        .store()
        .delete(&paths::product(&ProductId::new(id))?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
