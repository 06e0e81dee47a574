//! Atelier Admin library.
//!
//! Role-gated administration API over the shared document store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;
use tower_sessions::SessionStore;

use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Build the admin router with its middleware stack.
pub fn build_app<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_layer = create_session_layer(session_store, state.config());

    Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{self, Method, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use atelier_core::AdminRole;
    use atelier_store::{Connected, IdentityProvider, grant_role};

    use super::*;
    use crate::config::AdminConfig;

    const PASSWORD: &str = "correct horse battery";

    struct TestAdmin {
        router: Router,
        connected: Connected,
        cookie: Option<String>,
    }

    impl TestAdmin {
        fn new() -> Self {
            let connected = Connected::memory();
            let state = AppState::new(
                AdminConfig::local("http://localhost:3001"),
                connected.store.clone(),
            );
            Self {
                router: build_app(state, tower_sessions::MemoryStore::default()),
                connected,
                cookie: None,
            }
        }

        async fn user(&self, email: &str, role: Option<AdminRole>) {
            let identity = IdentityProvider::new(self.connected.store.clone())
                .register(email, PASSWORD)
                .await
                .unwrap();
            if let Some(role) = role {
                grant_role(&self.connected.store, &identity.uid, role)
                    .await
                    .unwrap();
            }
        }

        async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let mut request = http::Request::builder().method(method).uri(uri);
            if let Some(cookie) = &self.cookie {
                request = request.header(header::COOKIE, cookie);
            }
            let request = match body {
                Some(body) => request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => request.body(Body::empty()).unwrap(),
            };

            let response = self.router.clone().oneshot(request).await.unwrap();
            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
                self.cookie = Some(pair.to_string());
            }
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
        }

        async fn login(&mut self, email: &str) -> StatusCode {
            self.send(
                Method::POST,
                "/auth/login",
                Some(json!({"email": email, "password": PASSWORD})),
            )
            .await
            .0
        }
    }

    fn shirt() -> Value {
        json!({"name": "Linen Shirt", "price": "60", "sizes": ["M", "L"], "category": "shirts"})
    }

    #[tokio::test]
    async fn test_routes_require_login() {
        let mut admin = TestAdmin::new();
        let (status, _) = admin.send(Method::GET, "/dashboard", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_without_role_cannot_sign_in() {
        let mut admin = TestAdmin::new();
        admin.user("shopper@example.com", None).await;
        assert_eq!(admin.login("shopper@example.com").await, StatusCode::FORBIDDEN);
        assert!(admin.cookie.is_none());
    }

    #[tokio::test]
    async fn test_viewer_reads_but_cannot_write() {
        let mut admin = TestAdmin::new();
        admin.user("viewer@example.com", Some(AdminRole::Viewer)).await;
        assert_eq!(admin.login("viewer@example.com").await, StatusCode::OK);

        let (status, _) = admin.send(Method::GET, "/products", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = admin.send(Method::POST, "/products", Some(shirt())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_product_crud() {
        let mut admin = TestAdmin::new();
        admin.user("admin@example.com", Some(AdminRole::Admin)).await;
        admin.login("admin@example.com").await;

        let (status, created) = admin.send(Method::POST, "/products", Some(shirt())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let mut changed = shirt();
        changed["price"] = json!("55");
        let (status, updated) = admin
            .send(Method::PUT, &format!("/products/{id}"), Some(changed))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["price"], "55");

        let (status, list) = admin.send(Method::GET, "/products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) = admin
            .send(Method::DELETE, &format!("/products/{id}"), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = admin.send(Method::GET, &format!("/products/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_product_is_rejected() {
        let mut admin = TestAdmin::new();
        admin.user("admin@example.com", Some(AdminRole::Admin)).await;
        admin.login("admin@example.com").await;

        let (status, body) = admin
            .send(
                Method::POST,
                "/products",
                Some(json!({"name": "", "price": "0", "sizes": []})),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["name"].is_string());
        assert!(body["errors"]["price"].is_string());
        assert!(body["errors"]["sizes"].is_string());
    }

    #[tokio::test]
    async fn test_category_slug_is_derived() {
        let mut admin = TestAdmin::new();
        admin.user("admin@example.com", Some(AdminRole::SuperAdmin)).await;
        admin.login("admin@example.com").await;

        let (status, category) = admin
            .send(Method::POST, "/categories", Some(json!({"name": "Summer Dresses"})))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(category["slug"], "summer-dresses");
    }

    #[tokio::test]
    async fn test_hero_settings_lifecycle() {
        let mut admin = TestAdmin::new();
        admin.user("admin@example.com", Some(AdminRole::Admin)).await;
        admin.login("admin@example.com").await;

        let (status, _) = admin.send(Method::GET, "/settings/hero", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let hero = json!({"title": "New Season", "subtitle": "Linen is back"});
        let (status, _) = admin.send(Method::PUT, "/settings/hero", Some(hero)).await;
        assert_eq!(status, StatusCode::OK);
        let (_, saved) = admin.send(Method::GET, "/settings/hero", None).await;
        assert_eq!(saved["title"], "New Season");

        let (status, _) = admin.send(Method::DELETE, "/settings/hero", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_dashboard_reports_catalog_and_orders() {
        let mut admin = TestAdmin::new();
        admin.user("viewer@example.com", Some(AdminRole::Viewer)).await;
        admin.login("viewer@example.com").await;
        admin
            .connected
            .store
            .put(
                &atelier_store::paths::product(&atelier_core::ProductId::new("shirt")).unwrap(),
                &shirt(),
            )
            .await
            .unwrap();

        let (status, stats) = admin.send(Method::GET, "/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["productCount"], 1);
        assert_eq!(stats["orderCount"], 0);
        assert_eq!(stats["pendingOrders"], 0);
        assert_eq!(stats["revenue"], "0");
    }

    #[tokio::test]
    async fn test_revoked_role_takes_effect_immediately() {
        let mut admin = TestAdmin::new();
        admin.user("admin@example.com", Some(AdminRole::Admin)).await;
        admin.login("admin@example.com").await;

        let (uid, _) = IdentityProvider::new(admin.connected.store.clone())
            .find_by_email(&atelier_core::Email::parse("admin@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        atelier_store::revoke_role(&admin.connected.store, &uid)
            .await
            .unwrap();

        let (status, _) = admin.send(Method::GET, "/dashboard", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
