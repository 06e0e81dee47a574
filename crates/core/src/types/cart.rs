//! Shopping cart line items and derived totals.
//!
//! A cart is the collection `users/{uid}/shopping_cart_items`. Each document is
//! one [`CartItem`] whose id is the composite [`CartKey`] of product, size and
//! variant color, so the collection holds at most one line per combination.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::{Product, ProductVariant};
use super::price::line_total;
use super::{CartItemId, ProductId};

/// Image marker used when neither the variant nor the product has an image.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.svg";

/// Color segment used in the composite key when no variant is selected.
const NO_VARIANT_SEGMENT: &str = "default";

/// Composite key `productId_size_variantColor` identifying a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartKey(String);

impl CartKey {
    /// Build the key for a product, size and optional variant color.
    ///
    /// `/` is not allowed in document ids, so any occurrence in the segments
    /// is replaced with `-`.
    #[must_use]
    pub fn new(product_id: &ProductId, size: &str, color: Option<&str>) -> Self {
        let color = color.unwrap_or(NO_VARIANT_SEGMENT);
        let key = format!("{}_{size}_{color}", product_id.as_str());
        Self(key.replace('/', "-"))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as a cart item document id.
    #[must_use]
    pub fn to_item_id(&self) -> CartItemId {
        CartItemId::new(self.0.clone())
    }
}

impl std::fmt::Display for CartKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[serde(default = "empty_item_id")]
    pub id: CartItemId,
    pub product_id: ProductId,
    pub name: String,
    /// Unit price: the variant price if a variant was chosen, else the base price.
    pub price: Decimal,
    pub quantity: u32,
    pub size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub image: String,
}

fn empty_item_id() -> CartItemId {
    CartItemId::new("")
}

impl CartItem {
    /// Build a fresh line for a product selection.
    ///
    /// The image is the variant's first image, else the product's first image,
    /// else [`PLACEHOLDER_IMAGE`].
    #[must_use]
    pub fn for_selection(
        product: &Product,
        size: &str,
        quantity: u32,
        variant: Option<&ProductVariant>,
    ) -> Self {
        let key = CartKey::new(&product.id, size, variant.map(|v| v.color.as_str()));
        Self {
            id: key.to_item_id(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.display_price(variant),
            quantity,
            size: size.to_owned(),
            color: variant.map(|v| v.color.clone()),
            image: product
                .display_image(variant)
                .unwrap_or(PLACEHOLDER_IMAGE)
                .to_owned(),
        }
    }

    /// `price × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.price, self.quantity)
    }
}

/// The cart's items together with values derived from them.
///
/// Always construct through [`CartSnapshot::from_items`] so `total` and
/// `item_count` stay consistent with `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    /// Sum of `price × quantity` over all items.
    pub total: Decimal,
    /// Sum of quantities over all items.
    pub item_count: u64,
}

impl CartSnapshot {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
            item_count: 0,
        }
    }

    /// Build a snapshot, computing the derived totals.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let total = items.iter().map(CartItem::line_total).sum();
        let item_count = items.iter().map(|item| u64::from(item.quantity)).sum();
        Self {
            items,
            total,
            item_count,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up a line by its id.
    #[must_use]
    pub fn item(&self, id: &CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(images: &[&str], variants: Vec<ProductVariant>) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": "tee",
            "name": "Tee",
            "price": "80",
            "sizes": ["M"],
            "images": images,
        }))
        .map(|mut p: Product| {
            p.variants = variants;
            p
        })
        .unwrap()
    }

    fn red(images: &[&str]) -> ProductVariant {
        ProductVariant {
            color: "Red".to_string(),
            price: Decimal::new(100, 0),
            images: images.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_cart_key_format() {
        let id = ProductId::new("tee");
        assert_eq!(CartKey::new(&id, "M", Some("Red")).as_str(), "tee_M_Red");
        assert_eq!(CartKey::new(&id, "M", None).as_str(), "tee_M_default");
        assert_eq!(CartKey::new(&id, "S/M", None).as_str(), "tee_S-M_default");
    }

    #[test]
    fn test_selection_uses_variant_price_and_image() {
        let variant = red(&["/img/red.jpg"]);
        let p = product(&["/img/tee.jpg"], vec![variant.clone()]);
        let item = CartItem::for_selection(&p, "M", 2, Some(&variant));

        assert_eq!(item.id.as_str(), "tee_M_Red");
        assert_eq!(item.price, Decimal::new(100, 0));
        assert_eq!(item.image, "/img/red.jpg");
        assert_eq!(item.color.as_deref(), Some("Red"));
        assert_eq!(item.line_total(), Decimal::new(200, 0));
    }

    #[test]
    fn test_selection_image_fallbacks() {
        let variant = red(&[]);
        let p = product(&["/img/tee.jpg"], vec![variant.clone()]);
        assert_eq!(
            CartItem::for_selection(&p, "M", 1, Some(&variant)).image,
            "/img/tee.jpg"
        );

        let bare = product(&[], Vec::new());
        let item = CartItem::for_selection(&bare, "M", 1, None);
        assert_eq!(item.image, PLACEHOLDER_IMAGE);
        assert_eq!(item.price, Decimal::new(80, 0));
        assert_eq!(item.color, None);
    }

    #[test]
    fn test_snapshot_totals() {
        let variant = red(&[]);
        let p = product(&[], vec![variant.clone()]);
        let mut red_line = CartItem::for_selection(&p, "M", 5, Some(&variant));
        red_line.quantity = 5;
        let plain = CartItem::for_selection(&p, "M", 3, None);

        let snapshot = CartSnapshot::from_items(vec![red_line, plain]);
        assert_eq!(snapshot.total, Decimal::new(740, 0));
        assert_eq!(snapshot.item_count, 8);
        assert!(snapshot.item(&CartItemId::new("tee_M_default")).is_some());
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = CartSnapshot::from_items(Vec::new());
        assert!(snapshot.is_empty());
        assert_eq!(snapshot, CartSnapshot::empty());
    }
}
