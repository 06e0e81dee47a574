//! Application state shared across handlers.

use std::sync::Arc;

use atelier_store::{IdentityProvider, Store};

use crate::cart::CartRegistry;
use crate::config::StorefrontConfig;
use crate::suggestions::{ClaudeError, ClaudeOutfitModel, OutfitModel};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// document store, the identity provider and the open carts.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    store: Store,
    identity: IdentityProvider,
    carts: CartRegistry,
    outfit_model: Option<Arc<dyn OutfitModel>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The Claude outfit model is enabled when the configuration carries an
    /// API key.
    ///
    /// # Errors
    ///
    /// Returns `ClaudeError` if the Claude client cannot be built.
    pub fn new(config: StorefrontConfig, store: Store) -> Result<Self, ClaudeError> {
        let outfit_model = match &config.claude {
            Some(claude) => {
                let model: Arc<dyn OutfitModel> = Arc::new(ClaudeOutfitModel::new(claude)?);
                Some(model)
            }
            None => {
                tracing::warn!("ANTHROPIC_API_KEY not set, outfit suggestions disabled");
                None
            }
        };
        Ok(Self::with_outfit_model(config, store, outfit_model))
    }

    /// Create state with an explicit outfit model (or none).
    #[must_use]
    pub fn with_outfit_model(
        config: StorefrontConfig,
        store: Store,
        outfit_model: Option<Arc<dyn OutfitModel>>,
    ) -> Self {
        let carts = CartRegistry::new(store.clone(), config.cart_idle);
        let identity = IdentityProvider::new(store.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                identity,
                carts,
                outfit_model,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// Get a reference to the identity provider.
    #[must_use]
    pub fn identity(&self) -> &IdentityProvider {
        &self.inner.identity
    }

    /// Get a reference to the cart registry.
    #[must_use]
    pub fn carts(&self) -> &CartRegistry {
        &self.inner.carts
    }

    /// The outfit model, if suggestions are enabled.
    #[must_use]
    pub fn outfit_model(&self) -> Option<&dyn OutfitModel> {
        self.inner.outfit_model.as_deref()
    }
}
