//! Collection and document paths.
//!
//! Paths alternate collection names and document ids, the way a hosted
//! document database addresses nested collections:
//!
//! ```text
//! products                              collection
//! products/tee-001                      document
//! users/{uid}/shopping_cart_items       collection nested under a document
//! users/{uid}/shopping_cart_items/{id}  document
//! ```
//!
//! Segments must be non-empty and must not contain `/`.

use std::fmt;

use atelier_core::{CartItemId, CategoryId, Email, OrderId, ProductId, UserId};

use crate::error::StoreError;

/// Path to a collection (odd number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Parse a collection path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if any segment is empty or the path
    /// has an even number of segments.
    pub fn parse(path: &str) -> Result<Self, StoreError> {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) || segments.len() % 2 == 0 {
            return Err(StoreError::InvalidPath(path.to_owned()));
        }
        Ok(Self(path.to_owned()))
    }

    /// Path of a document in this collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if `id` is empty or contains `/`.
    pub fn doc(&self, id: &str) -> Result<DocumentPath, StoreError> {
        validate_segment(id)?;
        Ok(DocumentPath {
            collection: self.clone(),
            id: id.to_owned(),
        })
    }

    /// The path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path to a single document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    /// The collection that holds this document.
    #[must_use]
    pub const fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// The document id (last path segment).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sub-collection nested under this document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` if `name` is empty or contains `/`.
    pub fn collection_under(&self, name: &str) -> Result<CollectionPath, StoreError> {
        validate_segment(name)?;
        Ok(CollectionPath(format!("{self}/{name}")))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

fn validate_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty() || segment.contains('/') {
        return Err(StoreError::InvalidPath(segment.to_owned()));
    }
    Ok(())
}

/// Singleton site configuration documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteSetting {
    Hero,
    Footer,
}

impl SiteSetting {
    const fn id(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Footer => "footer",
        }
    }
}

/// Well-known locations of every collection the storefront uses.
pub mod paths {
    use super::{
        CartItemId, CategoryId, CollectionPath, DocumentPath, Email, OrderId, ProductId,
        SiteSetting, StoreError, UserId,
    };

    /// Name of the per-user cart sub-collection.
    pub const CART_ITEMS: &str = "shopping_cart_items";

    fn root(name: &str) -> CollectionPath {
        CollectionPath(name.to_owned())
    }

    #[must_use]
    pub fn products() -> CollectionPath {
        root("products")
    }

    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for an empty or nested id.
    pub fn product(id: &ProductId) -> Result<DocumentPath, StoreError> {
        products().doc(id.as_str())
    }

    #[must_use]
    pub fn categories() -> CollectionPath {
        root("categories")
    }

    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for an empty or nested id.
    pub fn category(id: &CategoryId) -> Result<DocumentPath, StoreError> {
        categories().doc(id.as_str())
    }

    #[must_use]
    pub fn orders() -> CollectionPath {
        root("orders")
    }

    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for an empty or nested id.
    pub fn order(id: &OrderId) -> Result<DocumentPath, StoreError> {
        orders().doc(id.as_str())
    }

    /// # Errors
    ///
    /// Never fails in practice; the setting ids are constants.
    pub fn site_setting(setting: SiteSetting) -> Result<DocumentPath, StoreError> {
        root("site_settings").doc(setting.id())
    }

    #[must_use]
    pub fn roles() -> CollectionPath {
        root("roles")
    }

    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for an empty or nested id.
    pub fn role(uid: &UserId) -> Result<DocumentPath, StoreError> {
        roles().doc(uid.as_str())
    }

    #[must_use]
    pub fn users() -> CollectionPath {
        root("users")
    }

    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for an empty or nested id.
    pub fn user(uid: &UserId) -> Result<DocumentPath, StoreError> {
        users().doc(uid.as_str())
    }

    /// Email → uid index used for sign-in lookups.
    ///
    /// # Errors
    ///
    /// Never fails for a parsed [`Email`], which rejects `/`.
    pub fn user_email(email: &Email) -> Result<DocumentPath, StoreError> {
        root("user_emails").doc(email.as_str())
    }

    /// The cart collection `users/{uid}/shopping_cart_items`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for an empty or nested uid.
    pub fn cart_items(uid: &UserId) -> Result<CollectionPath, StoreError> {
        user(uid)?.collection_under(CART_ITEMS)
    }

    /// # Errors
    ///
    /// Returns `StoreError::InvalidPath` for an empty or nested id.
    pub fn cart_item(uid: &UserId, item: &CartItemId) -> Result<DocumentPath, StoreError> {
        cart_items(uid)?.doc(item.as_str())
    }
}
