//! Catalog and site settings route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use atelier_core::{Category, FooterSettings, HeroSection, Product, ProductId};
use atelier_store::{SiteSetting, paths};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Only products in this category.
    pub category: Option<String>,
    /// Only featured (or only non-featured) products.
    pub featured: Option<bool>,
}

impl ProductQuery {
    fn matches(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| product.category.eq_ignore_ascii_case(category))
            && self.featured.is_none_or(|featured| product.featured == featured)
    }
}

/// `GET /products`
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let mut products: Vec<Product> = state.store().list(&paths::products()).await?;
    products.retain(|product| query.matches(product));
    Ok(Json(products))
}

/// `GET /products/{id}`
#[instrument(skip(state))]
pub async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let path = paths::product(&ProductId::new(id))?;
    state
        .store()
        .get::<Product>(&path)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
}

/// `GET /categories`
#[instrument(skip(state))]
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let mut categories: Vec<Category> = state.store().list(&paths::categories()).await?;
    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(categories))
}

/// `GET /site/hero`
#[instrument(skip(state))]
pub async fn hero(State(state): State<AppState>) -> Result<Json<HeroSection>> {
    state
        .store()
        .get::<HeroSection>(&paths::site_setting(SiteSetting::Hero)?)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Hero section".to_string()))
}

/// `GET /site/footer`
///
/// An unset footer is served as the empty default.
#[instrument(skip(state))]
pub async fn footer(State(state): State<AppState>) -> Result<Json<FooterSettings>> {
    let footer = state
        .store()
        .get::<FooterSettings>(&paths::site_setting(SiteSetting::Footer)?)
        .await?
        .unwrap_or_default();
    Ok(Json(footer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(category: &str, featured: bool) -> Product {
        Product {
            category: category.to_string(),
            featured,
            ..Product::default()
        }
    }

    #[test]
    fn test_query_filters() {
        let all = ProductQuery::default();
        assert!(all.matches(&product("shirts", false)));

        let shirts = ProductQuery {
            category: Some("Shirts".to_string()),
            featured: None,
        };
        assert!(shirts.matches(&product("shirts", true)));
        assert!(!shirts.matches(&product("shoes", true)));

        let featured = ProductQuery {
            category: None,
            featured: Some(true),
        };
        assert!(featured.matches(&product("shoes", true)));
        assert!(!featured.matches(&product("shoes", false)));
    }
}
