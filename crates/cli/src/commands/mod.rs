//! CLI command implementations.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;

use mystore_cart::{ApiError, CartError, CheckoutError, SessionError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{}", .0.user_message())]
    Checkout(#[from] CheckoutError),

    /// Writing to the terminal failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}
