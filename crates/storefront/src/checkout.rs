//! Checkout: turn the current cart into an order.
//!
//! The order is written to `orders/{orderId}` and awaited. Removing the
//! ordered lines afterwards runs in the background; a partial removal is
//! logged and does not affect the placed order. Lines that appear while the
//! order is being written stay in the cart.

use chrono::Utc;
use rand::seq::IndexedRandom;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use atelier_core::{Email, FieldErrors, Order, OrderId, OrderLine, OrderStatus, ShippingDetails};
use atelier_store::{Store, StoreError, paths};

use crate::cart::CartStore;

/// Characters used for the random order id suffix.
const ORDER_SUFFIX_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ORDER_SUFFIX_LEN: usize = 6;

const PHONE_MIN_LEN: usize = 7;
const PHONE_MAX_LEN: usize = 20;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// One or more form fields are invalid.
    #[error("invalid checkout details: {0}")]
    Validation(FieldErrors),

    /// There is nothing to buy.
    #[error("cart is empty")]
    EmptyCart,

    /// Writing the order failed.
    #[error("failed to save order: {0}")]
    Store(#[from] StoreError),
}

/// Contact and shipping form submitted at checkout.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CheckoutForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl CheckoutForm {
    /// Validate the form into shipping details.
    ///
    /// Values are trimmed and the email is normalized.
    ///
    /// # Errors
    ///
    /// Returns every invalid field with a message.
    pub fn validate(&self) -> Result<ShippingDetails, FieldErrors> {
        let mut errors = FieldErrors::new();

        let full_name = self.full_name.trim();
        errors.check(full_name.is_empty(), "fullName", "Full name is required");

        let email = match Email::parse(&self.email) {
            Ok(email) => email.into_inner(),
            Err(_) => {
                errors.add("email", "Enter a valid email address");
                String::new()
            }
        };

        let phone = self.phone.trim();
        errors.check(!is_valid_phone(phone), "phone", "Enter a valid phone number");

        let address = self.address.trim();
        errors.check(address.is_empty(), "address", "Address is required");
        let city = self.city.trim();
        errors.check(city.is_empty(), "city", "City is required");
        let postal_code = self.postal_code.trim();
        errors.check(postal_code.is_empty(), "postalCode", "Postal code is required");
        let country = self.country.trim();
        errors.check(country.is_empty(), "country", "Country is required");

        errors.into_result(ShippingDetails {
            full_name: full_name.to_owned(),
            email,
            phone: phone.to_owned(),
            address: address.to_owned(),
            city: city.to_owned(),
            postal_code: postal_code.to_owned(),
            country: country.to_owned(),
        })
    }
}

fn is_valid_phone(phone: &str) -> bool {
    let len = phone.chars().count();
    (PHONE_MIN_LEN..=PHONE_MAX_LEN).contains(&len)
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
        && phone.chars().any(|c| c.is_ascii_digit())
}

/// Generate an order id of the form `ORD-{unix_millis}-{SUFFIX}`.
#[must_use]
pub fn generate_order_id() -> OrderId {
    let mut rng = rand::rng();
    let suffix: String = (0..ORDER_SUFFIX_LEN)
        .filter_map(|_| ORDER_SUFFIX_CHARSET.choose(&mut rng).copied().map(char::from))
        .collect();
    OrderId::new(format!("ORD-{}-{suffix}", Utc::now().timestamp_millis()))
}

/// Place an order for everything in `cart`.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if the cart has no lines,
/// `CheckoutError::Validation` for bad form fields, or
/// `CheckoutError::Store` if the order cannot be saved.
#[instrument(skip(store, cart, form))]
pub async fn place_order(
    store: &Store,
    cart: &CartStore,
    form: &CheckoutForm,
) -> Result<Order, CheckoutError> {
    let snapshot = cart.snapshot();
    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let shipping = form.validate().map_err(CheckoutError::Validation)?;

    let order = Order {
        id: generate_order_id(),
        shipping,
        items: snapshot.items.iter().map(OrderLine::from).collect(),
        total: snapshot.total,
        created_at: Utc::now(),
        user_id: cart.identity().map(|identity| identity.uid.clone()),
        status: OrderStatus::Pending,
    };

    store.insert(&paths::order(&order.id)?, &order).await?;
    tracing::info!(order_id = %order.id, total = %order.total, "Order placed");

    // Only the ordered lines; failures are logged by the write itself.
    let ordered: Vec<_> = snapshot.items.iter().map(|item| item.id.clone()).collect();
    match cart.remove_items(&ordered) {
        Ok(clear) => drop(clear),
        Err(e) => tracing::warn!(error = %e, "Could not clear cart after checkout"),
    }

    Ok(order)
}
