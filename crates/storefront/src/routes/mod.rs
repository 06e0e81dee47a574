//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness
//! GET    /health/ready          - Readiness (document store ping)
//!
//! # Catalog
//! GET    /products              - Product listing (?category=, ?featured=)
//! GET    /products/{id}         - Product detail
//! GET    /categories            - Category listing
//! GET    /site/hero             - Hero section
//! GET    /site/footer           - Footer settings
//!
//! # Auth
//! POST   /auth/register         - Create account and sign in
//! POST   /auth/login            - Sign in
//! POST   /auth/logout           - Sign out
//! GET    /auth/me               - Current identity
//!
//! # Cart
//! GET    /cart                  - Current cart snapshot
//! DELETE /cart                  - Clear cart
//! POST   /cart/items            - Add item
//! PATCH  /cart/items/{id}       - Set quantity (<= 0 removes)
//! DELETE /cart/items/{id}       - Remove item
//!
//! # Checkout
//! GET    /checkout              - Checkout state (409 when the cart is empty)
//! POST   /checkout              - Place order
//!
//! # Account (requires auth)
//! GET    /account/orders        - Order history
//!
//! # Suggestions
//! POST   /suggestions           - Outfit suggestions for a style prompt
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod suggestions;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", patch(cart::update).delete(cart::remove))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/products", get(catalog::list_products))
        .route("/products/{id}", get(catalog::show_product))
        .route("/categories", get(catalog::list_categories))
        .route("/site/hero", get(catalog::hero))
        .route("/site/footer", get(catalog::footer))
        .nest("/auth", auth_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/account/orders", get(account::orders))
        .route("/suggestions", post(suggestions::suggest))
}
