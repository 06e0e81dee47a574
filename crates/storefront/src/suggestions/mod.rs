//! AI outfit suggestions.
//!
//! A style prompt and the catalog's product names go to an [`OutfitModel`],
//! which answers with product names. The answer is checked against the real
//! catalog so that invented items never reach the customer.

mod claude;
mod error;

pub use claude::ClaudeOutfitModel;
pub use error::{ClaudeError, SuggestionError};

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::Product;

/// Input sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub style_prompt: String,
    pub available_products: Vec<String>,
}

/// Output expected from the model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<String>,
}

/// A generative model that proposes outfit items by name.
#[async_trait]
pub trait OutfitModel: Send + Sync {
    /// Propose product names for the request.
    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, SuggestionError>;
}

/// Suggest products from `catalog` that match `style_prompt`.
///
/// Products are returned in the order the model ranked them, without
/// duplicates.
///
/// # Errors
///
/// Returns `SuggestionError::EmptyPrompt` for a blank prompt,
/// `SuggestionError::NoMatches` when no suggestion names a catalog product,
/// or the model's error.
#[instrument(skip(model, catalog), fields(catalog_size = catalog.len()))]
pub async fn suggest_outfit<'a>(
    model: &dyn OutfitModel,
    style_prompt: &str,
    catalog: &'a [Product],
) -> Result<Vec<&'a Product>, SuggestionError> {
    let style_prompt = style_prompt.trim();
    if style_prompt.is_empty() {
        return Err(SuggestionError::EmptyPrompt);
    }

    let request = SuggestionRequest {
        style_prompt: style_prompt.to_owned(),
        available_products: catalog.iter().map(|p| p.name.clone()).collect(),
    };

    let response = model.suggest(&request).await?;
    let matched = match_catalog(&response.suggestions, catalog);

    tracing::info!(
        suggested = response.suggestions.len(),
        matched = matched.len(),
        "Outfit suggestions filtered"
    );

    if matched.is_empty() {
        return Err(SuggestionError::NoMatches);
    }
    Ok(matched)
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Keep the suggestions that name a catalog product.
fn match_catalog<'a>(suggestions: &[String], catalog: &'a [Product]) -> Vec<&'a Product> {
    let mut seen = HashSet::new();
    suggestions
        .iter()
        .filter_map(|name| {
            let wanted = normalize(name);
            catalog.iter().find(|p| normalize(&p.name) == wanted)
        })
        .filter(|product| seen.insert(product.id.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use atelier_core::ProductId;

    use super::*;

    struct FixedModel {
        reply: Vec<String>,
        seen: Mutex<Option<SuggestionRequest>>,
    }

    impl FixedModel {
        fn new(reply: &[&str]) -> Self {
            Self {
                reply: reply.iter().map(ToString::to_string).collect(),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl OutfitModel for FixedModel {
        async fn suggest(
            &self,
            request: &SuggestionRequest,
        ) -> Result<SuggestionResponse, SuggestionError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            Ok(SuggestionResponse {
                suggestions: self.reply.clone(),
            })
        }
    }

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            ..Product::default()
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("shirt", "Linen Shirt"),
            product("chinos", "Stone Chinos"),
            product("loafers", "Suede Loafers"),
        ]
    }

    #[tokio::test]
    async fn test_unknown_names_are_dropped() {
        let model = FixedModel::new(&["Stone Chinos", "Silk Scarf", " linen shirt "]);
        let catalog = catalog();

        let products = suggest_outfit(&model, "summer wedding", &catalog).await.unwrap();
        let ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["chinos", "shirt"]);
    }

    #[tokio::test]
    async fn test_request_carries_prompt_and_catalog_names() {
        let model = FixedModel::new(&["Linen Shirt"]);
        let catalog = catalog();

        suggest_outfit(&model, "  beach day ", &catalog).await.unwrap();
        let request = model.seen.lock().unwrap().clone().unwrap();
        assert_eq!(request.style_prompt, "beach day");
        assert_eq!(
            request.available_products,
            vec!["Linen Shirt", "Stone Chinos", "Suede Loafers"]
        );
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("stylePrompt").is_some());
        assert!(json.get("availableProducts").is_some());
    }

    #[tokio::test]
    async fn test_empty_intersection_is_an_error() {
        let model = FixedModel::new(&["Silk Scarf", "Velvet Blazer"]);
        assert!(matches!(
            suggest_outfit(&model, "gala", &catalog()).await,
            Err(SuggestionError::NoMatches)
        ));
    }

    #[tokio::test]
    async fn test_blank_prompt_skips_the_model() {
        let model = FixedModel::new(&["Linen Shirt"]);
        assert!(matches!(
            suggest_outfit(&model, "   ", &catalog()).await,
            Err(SuggestionError::EmptyPrompt)
        ));
        assert!(model.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicates_collapse() {
        let model = FixedModel::new(&["Linen Shirt", "LINEN SHIRT"]);
        let catalog = catalog();
        let products = suggest_outfit(&model, "office", &catalog).await.unwrap();
        assert_eq!(products.len(), 1);
    }
}
