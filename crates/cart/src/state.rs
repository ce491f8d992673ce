//! Storefront context shared by every front-end handler.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::checkout::Checkout;
use crate::config::CartConfig;
use crate::session::Session;
use crate::storage::SharedStorage;
use crate::store::CartStore;
use crate::view::CartView;

/// Everything a front end needs, wired from one [`CartConfig`].
///
/// This struct is cheaply cloneable via `Arc`. All clones share the same
/// cart store, session and checkout state.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: CartConfig,
    store: Arc<CartStore>,
    session: Arc<Session>,
    api: ApiClient,
    checkout: Checkout<ApiClient>,
}

impl Storefront {
    /// Wire the cart core over `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API client cannot be built from `config.api`.
    pub fn new(config: CartConfig, storage: SharedStorage) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let store = Arc::new(CartStore::new(storage.clone(), config.cart_key.clone()));
        let session = Arc::new(Session::new(storage, config.session_roles.clone()));
        let checkout = Checkout::new(store.clone(), session.clone(), api.clone());

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                store,
                session,
                api,
                checkout,
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &CartConfig {
        &self.inner.config
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn store(&self) -> &CartStore {
        &self.inner.store
    }

    /// Get a reference to the session.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the checkout orchestrator.
    #[must_use]
    pub fn checkout(&self) -> &Checkout<ApiClient> {
        &self.inner.checkout
    }

    /// Current cart, formatted for display.
    #[must_use]
    pub fn cart_view(&self) -> CartView {
        CartView::new(&self.inner.store.load(), &self.inner.config.pricing)
    }
}
