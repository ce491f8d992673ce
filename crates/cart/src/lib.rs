//! MyStore cart core.
//!
//! Owns the persisted shopping cart, derives its totals, tracks the signed-in
//! session and turns the cart into a submitted order.
//!
//! # Architecture
//!
//! - [`store`] - Durable cart and the mutation API (add, set quantity, remove)
//! - [`totals`] - Subtotal, shipping, tax and total from a cart snapshot
//! - [`checkout`] - `Idle → Validating → Submitting → Succeeded | Failed`
//! - [`session`] - Bearer tokens per role, checked in priority order
//! - [`api`] - REST client for the store backend
//! - [`view`] - Render-ready cart view model
//! - [`state`] - [`Storefront`] context wiring all of the above from config
//!
//! Front ends never touch storage keys or compute money; they call into a
//! [`Storefront`] and draw the values it returns.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod totals;
pub mod view;

pub use api::{ApiClient, ApiError, OrderConfirmation, OrderPayload, Product};
pub use cart::{Cart, LineItem, MAX_UNIT_PRICE};
pub use checkout::{Checkout, CheckoutState, OrderGateway};
pub use config::{ApiConfig, CartConfig, ConfigError};
pub use error::{CartError, CheckoutError};
pub use session::{Credential, Session, SessionError, SessionRole};
pub use state::Storefront;
pub use storage::{FileStorage, MemoryStorage, SharedStorage, Storage, StorageError};
pub use store::CartStore;
pub use totals::{Pricing, Totals, compute_totals};
pub use view::{CartItemView, CartView};
