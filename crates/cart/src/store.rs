//! Persistent cart store and the cart mutation API.
//!
//! The whole cart is stored as one JSON array under a fixed key. `save` is
//! the only write path. Every mutation is a read-modify-write performed under
//! the store's lock with no suspension point, so two handlers cannot
//! interleave.

use std::sync::{Mutex, PoisonError};

use tracing::{debug, instrument, warn};

use crate::cart::{Cart, LineItem};
use crate::error::CartError;
use crate::storage::{SharedStorage, StorageError};

/// Durable cart owned by the core.
pub struct CartStore {
    storage: SharedStorage,
    key: String,
    lock: Mutex<()>,
}

impl CartStore {
    /// Create a store that keeps the cart under `key`.
    #[must_use]
    pub fn new(storage: SharedStorage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    /// Read the stored cart.
    ///
    /// Missing, unreadable or unparseable values yield an empty cart.
    #[must_use]
    pub fn load(&self) -> Cart {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read stored cart, using empty cart");
                return Cart::new();
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => cart.normalized(),
            Err(e) => {
                warn!(key = %self.key, error = %e, "Stored cart is malformed, using empty cart");
                Cart::new()
            }
        }
    }

    /// Replace the stored cart with `cart`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let raw = serde_json::to_string(cart)?;
        self.storage.set(&self.key, &raw)?;
        debug!(key = %self.key, items = cart.len(), "Saved cart");
        Ok(())
    }

    /// Store an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.save(&Cart::new())
    }

    /// Add a line item, merging with an existing item of the same id.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Validation` for a malformed candidate (nothing is
    /// written) or `CartError::Storage` if the cart cannot be persisted.
    #[instrument(skip(self, candidate), fields(id = %candidate.id, quantity = candidate.quantity))]
    pub fn add_item(&self, candidate: LineItem) -> Result<Cart, CartError> {
        self.mutate(|cart| cart.add(candidate))
    }

    /// Set the quantity of line item `id`, clamped to at least 1.
    ///
    /// An unknown id leaves the cart unchanged.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn set_quantity(&self, id: &str, quantity: i64) -> Result<Cart, CartError> {
        self.mutate(|cart| {
            if !cart.set_quantity(id, quantity) {
                debug!("No line item with this id");
            }
            Ok(())
        })
    }

    /// Remove line item `id` if present.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be persisted.
    #[instrument(skip(self))]
    pub fn remove_item(&self, id: &str) -> Result<Cart, CartError> {
        self.mutate(|cart| {
            if !cart.remove(id) {
                debug!("No line item with this id");
            }
            Ok(())
        })
    }

    /// Take the lines of a placed order out of the stored cart.
    ///
    /// Items added after `ordered` was loaded are kept.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the cart cannot be persisted.
    #[instrument(skip_all, fields(lines = ordered.len()))]
    pub fn remove_ordered(&self, ordered: &Cart) -> Result<Cart, CartError> {
        self.mutate(|cart| {
            cart.remove_ordered(ordered);
            Ok(())
        })
    }

    /// Total units in the stored cart.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.load().item_count()
    }

    fn mutate(
        &self,
        f: impl FnOnce(&mut Cart) -> Result<(), CartError>,
    ) -> Result<Cart, CartError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut cart = self.load();
        f(&mut cart)?;
        self.save(&cart)?;
        Ok(cart)
    }
}
