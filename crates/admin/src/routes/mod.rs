//! HTTP route handlers for admin.
//!
//! Every route except health and login requires an admin role; routes that
//! change data require a role that can write.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Liveness
//! GET    /health/ready             - Readiness
//!
//! # Auth
//! POST   /auth/login               - Sign in (admin role required)
//! POST   /auth/logout              - Sign out
//! GET    /auth/me                  - Current admin
//!
//! # Dashboard
//! GET    /dashboard                - Headline statistics
//!
//! # Catalog
//! GET    /products                 - Product listing
//! POST   /products                 - Create product
//! GET    /products/{id}            - Product detail
//! PUT    /products/{id}            - Replace product
//! DELETE /products/{id}            - Delete product
//! GET    /categories               - Category listing
//! POST   /categories               - Create category
//! PUT    /categories/{id}          - Replace category
//! DELETE /categories/{id}          - Delete category
//!
//! # Settings
//! GET|PUT|DELETE /settings/hero    - Hero section
//! GET|PUT|DELETE /settings/footer  - Footer
//!
//! # Orders
//! GET    /orders                   - Order listing (?status=)
//! GET    /orders/{id}              - Order detail
//! PATCH  /orders/{id}/status       - Advance or cancel an order
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod settings;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create all routes for admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/dashboard", get(dashboard::stats))
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::destroy),
        )
        .route(
            "/categories",
            get(categories::index).post(categories::create),
        )
        .route(
            "/categories/{id}",
            put(categories::update).delete(categories::destroy),
        )
        .route(
            "/settings/hero",
            get(settings::hero)
                .put(settings::put_hero)
                .delete(settings::delete_hero),
        )
        .route(
            "/settings/footer",
            get(settings::footer)
                .put(settings::put_footer)
                .delete(settings::delete_footer),
        )
        .route("/orders", get(orders::index))
        .route("/orders/{id}", get(orders::show))
        .route("/orders/{id}/status", patch(orders::update_status))
}
