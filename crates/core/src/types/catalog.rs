//! Catalog documents: products, their color variants, and categories.
//!
//! Field names serialize in `camelCase` to match the documents stored under
//! `products/{id}` and `categories/{id}`. The `id` field mirrors the document id
//! and defaults to empty when a document body omits it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CategoryId, FieldErrors, ProductId};

/// A color-specific sub-entity of a product with its own price and images.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    /// Color label, also the last segment of a cart composite key.
    pub color: String,
    /// Price that overrides the product's base price when selected.
    pub price: Decimal,
    /// Image references; the first one is used as the representative image.
    #[serde(default)]
    pub images: Vec<String>,
}

/// A catalog product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default = "empty_product_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Base price, used when no variant is selected.
    pub price: Decimal,
    /// Pre-discount price, shown struck through when higher than `price`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub country_of_origin: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub care_instructions: Option<String>,
}

fn empty_product_id() -> ProductId {
    ProductId::new("")
}

impl Product {
    /// Find a variant by its color label (exact match).
    #[must_use]
    pub fn variant_by_color(&self, color: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.color == color)
    }

    /// The price shown for an optional variant selection.
    #[must_use]
    pub fn display_price(&self, variant: Option<&ProductVariant>) -> Decimal {
        variant.map_or(self.price, |v| v.price)
    }

    /// The representative image for an optional variant selection.
    ///
    /// Falls back from the variant's first image to the product's first image.
    #[must_use]
    pub fn display_image<'a>(&'a self, variant: Option<&'a ProductVariant>) -> Option<&'a str> {
        variant
            .and_then(|v| v.images.first())
            .or_else(|| self.images.first())
            .map(String::as_str)
    }

    /// Whether the product is discounted relative to its original price.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.original_price.is_some_and(|original| original > self.price)
    }

    /// Whether the product offers the given size label.
    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }

    /// Check the fields an admin must get right before a product is stored.
    ///
    /// # Errors
    ///
    /// Returns every failing field: empty name, non-positive price, an original
    /// price not above the price, no sizes, or a non-positive variant price.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.name.trim().is_empty(), "name", "Name is required");
        errors.check(
            self.price <= Decimal::ZERO,
            "price",
            "Price must be greater than zero",
        );
        errors.check(
            self.original_price.is_some_and(|original| original <= self.price),
            "originalPrice",
            "Original price must be greater than the price",
        );
        errors.check(
            self.sizes.iter().all(|s| s.trim().is_empty()),
            "sizes",
            "Add at least one size",
        );
        errors.check(
            self.variants.iter().any(|v| v.price <= Decimal::ZERO),
            "variants",
            "Variant prices must be greater than zero",
        );
        errors.into_result(())
    }
}

/// A catalog category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default = "empty_category_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn empty_category_id() -> CategoryId {
    CategoryId::new("")
}

impl Category {
    /// Derive a URL slug from a category name: lowercase ASCII alphanumerics
    /// joined by single hyphens.
    #[must_use]
    pub fn slugify(name: &str) -> String {
        name.split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|part| !part.is_empty())
            .map(str::to_ascii_lowercase)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Fill in the slug from the name when it is blank.
    pub fn ensure_slug(&mut self) {
        if self.slug.trim().is_empty() {
            self.slug = Self::slugify(&self.name);
        }
    }

    /// Check the category before it is stored.
    ///
    /// # Errors
    ///
    /// Returns field errors for an empty name or slug.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check(self.name.trim().is_empty(), "name", "Name is required");
        errors.check(self.slug.is_empty(), "slug", "Slug is required");
        errors.into_result(())
    }
}
