//! End-to-end tests for Atelier.
//!
//! Each test starts the storefront and admin services on ephemeral ports over
//! one shared in-memory document store and drives them with real HTTP
//! clients.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p atelier-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use atelier_admin::config::AdminConfig;
use atelier_core::{AdminRole, Identity};
use atelier_store::{Backend, Connected, IdentityProvider, MemoryStore, Store, grant_role};
use atelier_storefront::config::StorefrontConfig;
use atelier_storefront::suggestions::OutfitModel;
use axum::Router;
use reqwest::Client;
use serde_json::Value;

/// Password used for every account created by the helpers.
pub const PASSWORD: &str = "correct horse battery";

/// Running services sharing one store.
pub struct TestContext {
    pub storefront_url: String,
    pub admin_url: String,
    pub connected: Connected,
}

impl TestContext {
    /// Start both services without an outfit model.
    pub async fn start() -> Self {
        Self::start_with_model(None).await
    }

    /// Start both services, wiring `model` into the storefront.
    pub async fn start_with_model(model: Option<Arc<dyn OutfitModel>>) -> Self {
        let connected = Connected::memory();

        let storefront = atelier_storefront::state::AppState::with_outfit_model(
            StorefrontConfig::local("http://127.0.0.1"),
            connected.store.clone(),
            model,
        );
        let storefront_url = serve(atelier_storefront::build_app(
            storefront,
            tower_sessions::MemoryStore::default(),
        ))
        .await;

        let admin = atelier_admin::state::AppState::new(
            AdminConfig::local("http://127.0.0.1"),
            connected.store.clone(),
        );
        let admin_url = serve(atelier_admin::build_app(
            admin,
            tower_sessions::MemoryStore::default(),
        ))
        .await;

        Self {
            storefront_url,
            admin_url,
            connected,
        }
    }

    /// The shared document store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.connected.store
    }

    /// The in-memory backend, for fault injection.
    #[must_use]
    pub fn memory(&self) -> &MemoryStore {
        match &self.connected.backend {
            Backend::Memory(memory) => memory,
            Backend::Postgres(_) => unreachable!("test context always uses the memory store"),
        }
    }

    /// URL of a storefront route.
    #[must_use]
    pub fn storefront(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// URL of an admin route.
    #[must_use]
    pub fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }

    /// Create an account directly through the identity provider.
    pub async fn user(&self, email: &str) -> Identity {
        IdentityProvider::new(self.store().clone())
            .register(email, PASSWORD)
            .await
            .expect("register test user")
    }

    /// Create an account holding `role` and return a client signed in to the
    /// admin service.
    pub async fn admin_client(&self, email: &str, role: AdminRole) -> Client {
        let identity = self.user(email).await;
        grant_role(self.store(), &identity.uid, role)
            .await
            .expect("grant role");

        let client = client();
        let response = client
            .post(self.admin("/auth/login"))
            .json(&serde_json::json!({"email": email, "password": PASSWORD}))
            .send()
            .await
            .expect("admin login");
        assert!(response.status().is_success(), "admin login failed");
        client
    }

    /// Register through the storefront and return the signed-in client.
    pub async fn shopper(&self, email: &str) -> Client {
        let client = client();
        let response = client
            .post(self.storefront("/auth/register"))
            .json(&serde_json::json!({"email": email, "password": PASSWORD}))
            .send()
            .await
            .expect("storefront register");
        assert!(response.status().is_success(), "storefront register failed");
        client
    }
}

/// An HTTP client that keeps session cookies.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// Read a JSON body, `Null` when empty.
pub async fn json(response: reqwest::Response) -> Value {
    let bytes = response.bytes().await.expect("read body");
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// Poll `GET url` until `done` accepts the body.
///
/// Cart clears after checkout run in the background, so their effect is
/// observed eventually rather than on the next request.
pub async fn eventually(client: &Client, url: &str, done: impl Fn(&Value) -> bool) -> Value {
    let mut last = Value::Null;
    for _ in 0..50 {
        let response = client.get(url).send().await.expect("poll request");
        last = json(response).await;
        if done(&last) {
            return last;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition not reached for {url}; last body: {last}");
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    format!("http://{addr}")
}
