//! Outfit suggestion route handler.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::Product;
use atelier_store::paths;

use crate::error::Result;
use crate::state::AppState;
use crate::suggestions::{SuggestionError, suggest_outfit};

/// Body of `POST /suggestions`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionForm {
    #[serde(default)]
    pub style_prompt: String,
}

/// Suggested catalog products.
#[derive(Debug, Serialize)]
pub struct SuggestionsView {
    pub products: Vec<Product>,
}

/// `POST /suggestions`
#[instrument(skip_all)]
pub async fn suggest(
    State(state): State<AppState>,
    Json(form): Json<SuggestionForm>,
) -> Result<Json<SuggestionsView>> {
    let model = state.outfit_model().ok_or(SuggestionError::Unavailable)?;
    let catalog: Vec<Product> = state.store().list(&paths::products()).await?;

    let products = suggest_outfit(model, &form.style_prompt, &catalog)
        .await?
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(SuggestionsView { products }))
}
