//! One live cart per signed-in user.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use atelier_core::{Identity, UserId};
use atelier_store::Store;

use super::{CartError, CartStore};

/// Upper bound on concurrently open carts.
const MAX_OPEN_CARTS: u64 = 10_000;

/// Keeps a [`CartStore`] per user so requests share one subscription.
///
/// Carts idle for longer than the configured period are evicted, which drops
/// their subscription.
#[derive(Clone)]
pub struct CartRegistry {
    store: Store,
    carts: Cache<UserId, Arc<CartStore>>,
}

impl CartRegistry {
    /// Create a registry that evicts carts after `idle` without use.
    #[must_use]
    pub fn new(store: Store, idle: Duration) -> Self {
        let carts = Cache::builder()
            .max_capacity(MAX_OPEN_CARTS)
            .time_to_idle(idle)
            .build();
        Self { store, carts }
    }

    /// The cart for `identity`, or a guest cart when signed out.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the cart subscription cannot be opened.
    pub async fn cart_for(&self, identity: Option<&Identity>) -> Result<Arc<CartStore>, CartError> {
        let Some(identity) = identity else {
            return Ok(Arc::new(CartStore::guest(self.store.clone())));
        };

        if let Some(cart) = self.carts.get(&identity.uid).await {
            return Ok(cart);
        }

        // Two requests racing here both open a subscription; the second insert
        // wins and the first cart is dropped with its request.
        let cart = Arc::new(CartStore::open(self.store.clone(), identity.clone()).await?);
        self.carts
            .insert(identity.uid.clone(), Arc::clone(&cart))
            .await;
        Ok(cart)
    }

    /// Drop a user's cart, e.g. on sign-out.
    pub async fn forget(&self, uid: &UserId) {
        self.carts.invalidate(uid).await;
    }
}
