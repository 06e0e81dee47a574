//! The signed-in identity supplied by the identity provider.

use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// A signed-in user as seen by the storefront and admin.
///
/// Stored in the session after sign-in and used to scope cart documents
/// (`users/{uid}/shopping_cart_items`) and look up admin roles (`roles/{uid}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id.
    pub uid: UserId,
    /// Normalized email address.
    pub email: Email,
}
