//! Outfit suggestions against a stub model.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use async_trait::async_trait;
use atelier_core::{Product, ProductId};
use atelier_integration_tests::{TestContext, client, json};
use atelier_store::paths;
use atelier_storefront::suggestions::{
    OutfitModel, SuggestionError, SuggestionRequest, SuggestionResponse,
};
use reqwest::StatusCode;
use serde_json::json;

/// Answers with a fixed list, including one product that does not exist.
struct FixedModel;

#[async_trait]
impl OutfitModel for FixedModel {
    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<SuggestionResponse, SuggestionError> {
        assert!(request.available_products.contains(&"Linen Shirt".to_string()));
        Ok(SuggestionResponse {
            suggestions: vec![
                "linen shirt".to_string(),
                "Velvet Cape".to_string(),
                "Straw Hat".to_string(),
            ],
        })
    }
}

#[tokio::test]
async fn test_suggestions_only_name_catalog_products() {
    let ctx = TestContext::start_with_model(Some(Arc::new(FixedModel))).await;
    for (id, name) in [("shirt", "Linen Shirt"), ("hat", "Straw Hat"), ("boot", "Boot")] {
        let product: Product =
            serde_json::from_value(json!({"name": name, "price": "30", "sizes": ["M"]})).unwrap();
        ctx.store()
            .put(&paths::product(&ProductId::new(id)).unwrap(), &product)
            .await
            .unwrap();
    }

    let http = client();
    let response = http
        .post(ctx.storefront("/suggestions"))
        .json(&json!({"stylePrompt": "summer picnic"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json(response).await;
    let names: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Linen Shirt", "Straw Hat"]);

    let response = http
        .post(ctx.storefront("/suggestions"))
        .json(&json!({"stylePrompt": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
