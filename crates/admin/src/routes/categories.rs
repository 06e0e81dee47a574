//! Category management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use atelier_core::{Category, CategoryId};
use atelier_store::paths;

use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireWriter};
use crate::state::AppState;

/// `GET /categories`
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<Category>>> {
    let mut categories: Vec<Category> = state.store().list(&paths::categories()).await?;
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(categories))
}

/// `POST /categories`
///
/// A blank slug is derived from the name.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Json(mut category): Json<Category>,
) -> Result<(StatusCode, Json<Category>)> {
    category.ensure_slug();
    category.validate()?;

    category.id = CategoryId::new(Uuid::new_v4().to_string());
    state
        .store()
        .insert(&paths::category(&category.id)?, &category)
        .await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /categories/{id}`
#[instrument(skip(state, category))]
pub async fn update(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Path(id): Path<String>,
    Json(mut category): Json<Category>,
) -> Result<Json<Category>> {
    category.id = CategoryId::new(id);
    category.ensure_slug();
    category.validate()?;

    let path = paths::category(&category.id)?;
    if state.store().get::<Category>(&path).await?.is_none() {
        return Err(AppError::NotFound("Category".to_string()));
    }
    state.store().put(&path, &category).await?;
    Ok(Json(category))
}

/// `DELETE /categories/{id}`
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireWriter(_): RequireWriter,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state
        .store()
        .delete(&paths::category(&CategoryId::new(id))?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
