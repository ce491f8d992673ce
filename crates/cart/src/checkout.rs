//! Checkout orchestration.
//!
//! A checkout moves through `Idle → Validating → Submitting` and ends in
//! `Succeeded` or `Failed`. The current state is published on a
//! `tokio::sync::watch` channel so a front end can show a busy indicator.
//! While one checkout is in flight a second one is refused without touching
//! the network.

use std::sync::Arc;

use mystore_core::SessionToken;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use crate::api::{ApiError, OrderConfirmation, OrderPayload};
use crate::error::CheckoutError;
use crate::session::Session;
use crate::store::CartStore;

/// Where a checkout attempt currently is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed(CheckoutError),
}

impl CheckoutState {
    /// True while an attempt is validating or waiting on the server.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }
}

/// Sends an order to whoever fulfils it.
pub trait OrderGateway: Send + Sync {
    /// Submit `order` on behalf of the bearer of `token`.
    fn submit_order(
        &self,
        token: &SessionToken,
        order: &OrderPayload,
    ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send;
}

/// Turns the stored cart into a submitted order.
pub struct Checkout<G> {
    store: Arc<CartStore>,
    session: Arc<Session>,
    gateway: G,
    state: watch::Sender<CheckoutState>,
}

impl<G: OrderGateway> Checkout<G> {
    /// Create an idle checkout.
    #[must_use]
    pub fn new(store: Arc<CartStore>, session: Arc<Session>, gateway: G) -> Self {
        let (state, _) = watch::channel(CheckoutState::Idle);
        Self {
            store,
            session,
            gateway,
            state,
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CheckoutState {
        self.state.borrow().clone()
    }

    /// Watch state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.state.subscribe()
    }

    /// Whether a checkout is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    /// The cart store this checkout drains.
    #[must_use]
    pub fn store(&self) -> &CartStore {
        &self.store
    }

    /// Submit the stored cart as an order.
    ///
    /// On success the submitted lines are taken out of the stored cart; items
    /// added while the order was in flight stay. On any failure the cart is
    /// left exactly as it was.
    ///
    /// # Errors
    ///
    /// - `CheckoutInProgress` if another checkout is running (state unchanged)
    /// - `AuthRequired` if no role holds a session token (nothing is sent)
    /// - `EmptyCart` if the cart has no line items (nothing is sent)
    /// - `ServerRejected`, `NetworkFailure`, `Decode` or `InvalidRequest` from
    ///   the submission
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<OrderConfirmation, CheckoutError> {
        let started = self.state.send_if_modified(|state| {
            if state.is_busy() {
                false
            } else {
                *state = CheckoutState::Validating;
                true
            }
        });
        if !started {
            warn!("Checkout already in progress");
            return Err(CheckoutError::CheckoutInProgress);
        }

        let _reset = ResetOnDrop(&self.state);

        let result = self.run().await;
        match &result {
            Ok(_) => {
                info!("Checkout succeeded");
                self.state.send_replace(CheckoutState::Succeeded);
            }
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Checkout failed");
                self.state.send_replace(CheckoutState::Failed(e.clone()));
            }
        }
        result
    }

    async fn run(&self) -> Result<OrderConfirmation, CheckoutError> {
        let credential = self
            .session
            .active_credential()
            .ok_or(CheckoutError::AuthRequired)?;

        let cart = self.store.load();
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order = OrderPayload::from_cart(&cart);
        self.state.send_replace(CheckoutState::Submitting);
        info!(role = %credential.role, items = cart.item_count(), "Submitting order");

        let confirmation = self
            .gateway
            .submit_order(&credential.token, &order)
            .await?;

        // The order is placed; a failed cart update is logged, never reported.
        if let Err(e) = self.store.remove_ordered(&cart) {
            error!(error = %e, "Order placed but the cart could not be updated");
        }

        Ok(confirmation)
    }
}

/// Returns the state to `Idle` if a checkout future is dropped mid-flight.
struct ResetOnDrop<'a>(&'a watch::Sender<CheckoutState>);

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|state| {
            if state.is_busy() {
                *state = CheckoutState::Idle;
                true
            } else {
                false
            }
        });
    }
}
