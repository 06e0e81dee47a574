//! The per-user cart store.

use tokio::task::JoinSet;
use tracing::instrument;

use atelier_core::{CartItem, CartItemId, CartSnapshot, Identity, Product, ProductVariant};
use atelier_store::{
    CollectionPath, CollectionWatch, Document, Fields, Store, StoreError, decode_all, paths,
};

use super::{CartError, PendingWrite};

/// Name of the integer field that holds a line's quantity.
const QUANTITY_FIELD: &str = "quantity";

/// Largest quantity one line can hold; it must still decode as `CartItem`.
pub const MAX_LINE_QUANTITY: u32 = u32::MAX;

struct Owner {
    identity: Identity,
    collection: CollectionPath,
    items: CollectionWatch,
}

/// Reactive view of one user's cart plus its mutations.
///
/// The view follows the remote `users/{uid}/shopping_cart_items` collection
/// through a live subscription. Mutations never touch the view directly; it
/// changes when the subscription delivers the new collection state.
pub struct CartStore {
    store: Store,
    owner: Option<Owner>,
}

impl CartStore {
    /// A cart for a signed-out visitor: always empty, every mutation is
    /// refused with `CartError::LoginRequired`.
    #[must_use]
    pub const fn guest(store: Store) -> Self {
        Self { store, owner: None }
    }

    /// Open the cart of a signed-in user and subscribe to it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the subscription cannot be established.
    #[instrument(skip(store, identity), fields(uid = %identity.uid))]
    pub async fn open(store: Store, identity: Identity) -> Result<Self, CartError> {
        let collection = paths::cart_items(&identity.uid)?;
        let items = store.watch(&collection).await?;
        tracing::debug!("Cart subscription opened");

        Ok(Self {
            store,
            owner: Some(Owner {
                identity,
                collection,
                items,
            }),
        })
    }

    /// The user this cart belongs to, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.owner.as_ref().map(|owner| &owner.identity)
    }

    /// The current items with their total and count.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.owner.as_ref().map_or_else(CartSnapshot::empty, |owner| {
            derive(&owner.collection, &owner.items.borrow())
        })
    }

    /// A receiver that is notified every time the cart changes.
    #[must_use]
    pub fn subscribe(&self) -> CartWatch {
        CartWatch {
            source: self
                .owner
                .as_ref()
                .map(|owner| (owner.collection.clone(), owner.items.clone())),
        }
    }

    fn owner(&self) -> Result<&Owner, CartError> {
        self.owner.as_ref().ok_or(CartError::LoginRequired)
    }

    /// Add `quantity` of a product selection to the cart.
    ///
    /// A line with the same product, size and variant grows by `quantity`;
    /// otherwise a new line is created. The store applies the increment
    /// atomically, so concurrent adds of the same line all count.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LoginRequired` for a guest cart and
    /// `CartError::InvalidQuantity` for a zero quantity. Nothing is written in
    /// either case. The write resolves to `CartError::QuantityTooLarge` when
    /// the line would pass [`MAX_LINE_QUANTITY`].
    #[instrument(skip(self, product, variant), fields(product_id = %product.id))]
    pub fn add_item(
        &self,
        product: &Product,
        size: &str,
        quantity: u32,
        variant: Option<&ProductVariant>,
    ) -> Result<PendingWrite, CartError> {
        let owner = self.owner()?;
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let item = CartItem::for_selection(product, size, quantity, variant);
        let path = owner.collection.doc(item.id.as_str())?;
        let store = self.store.clone();

        tracing::debug!(item_id = %item.id, quantity, "Adding to cart");
        Ok(PendingWrite::spawn("add_item", async move {
            store
                .increment(
                    &path,
                    QUANTITY_FIELD,
                    i64::from(item.quantity),
                    i64::from(MAX_LINE_QUANTITY),
                    &item,
                )
                .await
                .map_err(|e| match e {
                    StoreError::OutOfRange { .. } => CartError::QuantityTooLarge {
                        max: MAX_LINE_QUANTITY,
                    },
                    other => CartError::Store(other),
                })
        }))
    }

    /// Overwrite a line's quantity. Zero or a negative quantity removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LoginRequired` for a guest cart and
    /// `CartError::QuantityTooLarge` above [`MAX_LINE_QUANTITY`].
    #[instrument(skip(self))]
    pub fn update_quantity(
        &self,
        item_id: &CartItemId,
        quantity: i64,
    ) -> Result<PendingWrite, CartError> {
        if quantity <= 0 {
            return self.remove_item(item_id);
        }

        let owner = self.owner()?;
        let quantity = u32::try_from(quantity)
            .map_err(|_| CartError::QuantityTooLarge {
                max: MAX_LINE_QUANTITY,
            })?;
        let path = owner.collection.doc(item_id.as_str())?;
        let store = self.store.clone();

        let mut fields = Fields::new();
        fields.insert(QUANTITY_FIELD.to_owned(), quantity.into());

        Ok(PendingWrite::spawn("update_quantity", async move {
            store.update(&path, fields).await?;
            Ok(())
        }))
    }

    /// Delete a line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LoginRequired` for a guest cart.
    #[instrument(skip(self))]
    pub fn remove_item(&self, item_id: &CartItemId) -> Result<PendingWrite, CartError> {
        let owner = self.owner()?;
        let path = owner.collection.doc(item_id.as_str())?;
        let store = self.store.clone();

        Ok(PendingWrite::spawn("remove_item", async move {
            store.delete(&path).await?;
            Ok(())
        }))
    }

    /// Delete every line currently in the view.
    ///
    /// Each line is deleted separately. If some deletes fail the cart is left
    /// partially cleared and the write resolves to `CartError::PartialClear`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LoginRequired` for a guest cart.
    #[instrument(skip(self))]
    pub fn clear_cart(&self) -> Result<PendingWrite, CartError> {
        let owner = self.owner()?;
        let ids: Vec<CartItemId> = owner
            .items
            .borrow()
            .iter()
            .map(|doc| CartItemId::new(doc.id.clone()))
            .collect();
        self.remove_items(&ids)
    }

    /// Delete the given lines, leaving any others in place.
    ///
    /// Deletes run separately like [`CartStore::clear_cart`], with the same
    /// partial-failure reporting.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LoginRequired` for a guest cart.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn remove_items(&self, ids: &[CartItemId]) -> Result<PendingWrite, CartError> {
        let owner = self.owner()?;
        let targets = ids
            .iter()
            .map(|id| owner.collection.doc(id.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let store = self.store.clone();

        Ok(PendingWrite::spawn("remove_items", async move {
            let total = targets.len();
            let mut deletes = JoinSet::new();
            for path in targets {
                let store = store.clone();
                deletes.spawn(async move { store.delete(&path).await });
            }

            let mut failed = 0;
            while let Some(result) = deletes.join_next().await {
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, "Failed to remove cart item");
                        failed += 1;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Cart item delete task aborted");
                        failed += 1;
                    }
                }
            }

            if failed > 0 {
                return Err(CartError::PartialClear { failed, total });
            }
            Ok(())
        }))
    }
}

fn derive(collection: &CollectionPath, docs: &[Document]) -> CartSnapshot {
    CartSnapshot::from_items(decode_all(collection, docs))
}

/// Change notifications for one cart.
pub struct CartWatch {
    source: Option<(CollectionPath, CollectionWatch)>,
}

impl CartWatch {
    /// The latest snapshot, marking it as seen.
    pub fn current(&mut self) -> CartSnapshot {
        self.source
            .as_mut()
            .map_or_else(CartSnapshot::empty, |(collection, items)| {
                derive(collection, &items.borrow_and_update())
            })
    }

    /// Wait for the next change and return the new snapshot.
    ///
    /// Returns `None` for a guest cart or once the store has shut down.
    pub async fn changed(&mut self) -> Option<CartSnapshot> {
        let (collection, items) = self.source.as_mut()?;
        items.changed().await.ok()?;
        Some(derive(collection, &items.borrow_and_update()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use atelier_core::{CartKey, Email, PLACEHOLDER_IMAGE, ProductId, UserId};
    use atelier_store::{DocumentStore, MemoryStore};

    use super::*;

    fn tee() -> Product {
        Product {
            id: ProductId::new("tee"),
            name: "Tee".to_string(),
            price: Decimal::from(80),
            sizes: vec!["S".to_string(), "M".to_string()],
            images: vec!["/img/tee.jpg".to_string()],
            variants: vec![ProductVariant {
                color: "Red".to_string(),
                price: Decimal::from(100),
                images: vec!["/img/tee-red.jpg".to_string()],
            }],
            ..Product::default()
        }
    }

    fn ada() -> Identity {
        Identity {
            uid: UserId::new("u1"),
            email: Email::parse("ada@example.com").unwrap(),
        }
    }

    async fn open_cart() -> (Arc<MemoryStore>, CartStore) {
        let memory = Arc::new(MemoryStore::new());
        let store = Store::from_arc(memory.clone());
        let cart = CartStore::open(store, ada()).await.unwrap();
        (memory, cart)
    }

    #[tokio::test]
    async fn test_repeated_adds_merge_into_one_line() {
        let (_, cart) = open_cart().await;
        let product = tee();
        let red = product.variant_by_color("Red");

        cart.add_item(&product, "M", 2, red).unwrap().await.unwrap();
        cart.add_item(&product, "M", 3, red).unwrap().await.unwrap();

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        let line = &snapshot.items[0];
        assert_eq!(line.id.as_str(), "tee_M_Red");
        assert_eq!(line.quantity, 5);
        assert_eq!(line.price, Decimal::from(100));
        assert_eq!(line.line_total(), Decimal::from(500));
        assert_eq!(line.image, "/img/tee-red.jpg");
        assert_eq!(snapshot.total, Decimal::from(500));
        assert_eq!(snapshot.item_count, 5);
    }

    #[tokio::test]
    async fn test_concurrent_adds_all_count() {
        let (_, cart) = open_cart().await;
        let product = tee();

        let writes: Vec<_> = (0..10)
            .map(|_| cart.add_item(&product, "S", 1, None).unwrap())
            .collect();
        for write in writes {
            write.await.unwrap();
        }

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 10);
        assert_eq!(snapshot.items[0].id.as_str(), "tee_S_default");
        assert_eq!(snapshot.items[0].color, None);
    }

    #[tokio::test]
    async fn test_totals_span_all_lines() {
        let (_, cart) = open_cart().await;
        let product = tee();

        cart.add_item(&product, "S", 2, None).unwrap().await.unwrap();
        cart.add_item(&product, "M", 1, product.variant_by_color("Red"))
            .unwrap()
            .await
            .unwrap();

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.total, Decimal::from(2 * 80 + 100));
        assert_eq!(snapshot.item_count, 3);
    }

    #[tokio::test]
    async fn test_new_line_without_images_uses_placeholder() {
        let (_, cart) = open_cart().await;
        let product = Product {
            images: Vec::new(),
            variants: Vec::new(),
            ..tee()
        };

        cart.add_item(&product, "M", 1, None).unwrap().await.unwrap();
        assert_eq!(cart.snapshot().items[0].image, PLACEHOLDER_IMAGE);
    }

    #[tokio::test]
    async fn test_guest_cannot_mutate() {
        let memory = Arc::new(MemoryStore::new());
        let cart = CartStore::guest(Store::from_arc(memory.clone()));
        let id = CartKey::new(&ProductId::new("tee"), "M", None).to_item_id();

        assert!(matches!(
            cart.add_item(&tee(), "M", 1, None),
            Err(CartError::LoginRequired)
        ));
        assert!(matches!(
            cart.update_quantity(&id, 2),
            Err(CartError::LoginRequired)
        ));
        assert!(matches!(cart.remove_item(&id), Err(CartError::LoginRequired)));
        assert!(matches!(cart.clear_cart(), Err(CartError::LoginRequired)));
        assert!(cart.snapshot().is_empty());
        assert!(cart.identity().is_none());
    }

    #[tokio::test]
    async fn test_zero_quantity_add_rejected() {
        let (_, cart) = open_cart().await;
        assert!(matches!(
            cart.add_item(&tee(), "M", 0, None),
            Err(CartError::InvalidQuantity)
        ));
        assert!(cart.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_line_quantity_cannot_pass_the_maximum() {
        let (memory, cart) = open_cart().await;
        let product = tee();

        cart.add_item(&product, "M", MAX_LINE_QUANTITY, None)
            .unwrap()
            .await
            .unwrap();
        let overflow = cart.add_item(&product, "M", 1, None).unwrap().await;
        assert!(matches!(
            overflow,
            Err(CartError::QuantityTooLarge { max }) if max == MAX_LINE_QUANTITY
        ));

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, MAX_LINE_QUANTITY);
        assert_eq!(snapshot.item_count, u64::from(MAX_LINE_QUANTITY));

        let id = snapshot.items[0].id.clone();
        assert!(matches!(
            cart.update_quantity(&id, i64::from(MAX_LINE_QUANTITY) + 1),
            Err(CartError::QuantityTooLarge { .. })
        ));
        let stored = memory
            .get(&paths::cart_item(&ada().uid, &id).unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.data["quantity"], i64::from(MAX_LINE_QUANTITY));
    }

    #[tokio::test]
    async fn test_update_quantity_overwrites_or_removes() {
        let (_, cart) = open_cart().await;
        let product = tee();
        cart.add_item(&product, "S", 1, None).unwrap().await.unwrap();
        cart.add_item(&product, "M", 1, None).unwrap().await.unwrap();
        cart.add_item(&product, "M", 1, product.variant_by_color("Red"))
            .unwrap()
            .await
            .unwrap();

        let small = CartItemId::new("tee_S_default");
        let medium = CartItemId::new("tee_M_default");
        let red = CartItemId::new("tee_M_Red");

        cart.update_quantity(&small, 7).unwrap().await.unwrap();
        cart.update_quantity(&medium, 0).unwrap().await.unwrap();
        cart.update_quantity(&red, -2).unwrap().await.unwrap();

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.item(&small).unwrap().quantity, 7);
        assert!(snapshot.item(&medium).is_none());
        assert!(snapshot.item(&red).is_none());
    }

    #[tokio::test]
    async fn test_clear_cart_removes_every_line() {
        let (_, cart) = open_cart().await;
        let product = tee();
        for size in ["S", "M", "L"] {
            cart.add_item(&product, size, 1, None).unwrap().await.unwrap();
        }
        assert_eq!(cart.snapshot().items.len(), 3);

        cart.clear_cart().unwrap().await.unwrap();
        assert!(cart.snapshot().is_empty());
        assert_eq!(cart.snapshot().total, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_partial_clear_is_reported() {
        let (memory, cart) = open_cart().await;
        let product = tee();
        for size in ["S", "M", "L"] {
            cart.add_item(&product, size, 1, None).unwrap().await.unwrap();
        }

        memory.fail_next_writes(1);
        let result = cart.clear_cart().unwrap().await;
        assert!(matches!(
            result,
            Err(CartError::PartialClear {
                failed: 1,
                total: 3
            })
        ));
        assert_eq!(cart.snapshot().items.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_view_unchanged() {
        let (memory, cart) = open_cart().await;
        memory.fail_next_writes(1);

        let result = cart.add_item(&tee(), "M", 1, None).unwrap().await;
        assert!(matches!(result, Err(CartError::Store(_))));
        assert!(cart.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_remove_items_leaves_other_lines() {
        let (_, cart) = open_cart().await;
        cart.add_item(&tee(), "S", 1, None).unwrap().await.unwrap();
        cart.add_item(&tee(), "M", 3, None).unwrap().await.unwrap();
        let small = CartKey::new(&ProductId::new("tee"), "S", None).to_item_id();

        cart.remove_items(&[small]).unwrap().await.unwrap();

        let snapshot = cart.snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].id.as_str(), "tee_M_default");
        assert_eq!(snapshot.item_count, 3);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (_, cart) = open_cart().await;
        let mut watch = cart.subscribe();
        assert!(watch.current().is_empty());

        cart.add_item(&tee(), "M", 2, None).unwrap().await.unwrap();

        let snapshot = watch.changed().await.unwrap();
        assert_eq!(snapshot.item_count, 2);
    }

    #[tokio::test]
    async fn test_carts_are_isolated_per_user() {
        let memory = Arc::new(MemoryStore::new());
        let store = Store::from_arc(memory.clone());
        let ada_cart = CartStore::open(store.clone(), ada()).await.unwrap();
        let bob_cart = CartStore::open(
            store,
            Identity {
                uid: UserId::new("u2"),
                email: Email::parse("bob@example.com").unwrap(),
            },
        )
        .await
        .unwrap();

        ada_cart.add_item(&tee(), "M", 1, None).unwrap().await.unwrap();
        assert_eq!(ada_cart.snapshot().item_count, 1);
        assert!(bob_cart.snapshot().is_empty());
    }
}
