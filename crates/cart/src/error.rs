//! Error taxonomy reported to the render layer.
//!
//! Cart mutations fail only on malformed input or a storage backend fault.
//! Checkout failures carry a stable [`CheckoutError::kind`] label plus a
//! user-facing reason. None of these leave the cart in an invalid state.

use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors returned by the cart mutation API.
#[derive(Debug, Error)]
pub enum CartError {
    /// Malformed line-item input (a caller bug, not a user error).
    #[error("Invalid line item: {0}")]
    Validation(String),

    /// The storage backend could not persist the cart.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Reasons a checkout attempt ends in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// No session token under any configured role.
    #[error("You must be logged in to complete your purchase")]
    AuthRequired,

    /// The cart has no line items.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Another checkout from this context is still in flight.
    #[error("A checkout is already in progress")]
    CheckoutInProgress,

    /// The request could not complete.
    #[error("Network error: {0}")]
    NetworkFailure(String),

    /// The order endpoint answered with a non-success status.
    #[error("{message}")]
    ServerRejected {
        /// HTTP status code.
        status: u16,
        /// Server-supplied message, or a generic status description.
        message: String,
    },

    /// The server's success body could not be decoded.
    #[error("Unexpected response from server: {0}")]
    Decode(String),

    /// The request was refused locally and never sent.
    #[error("Request not sent: {0}")]
    InvalidRequest(String),
}

impl CheckoutError {
    /// Stable machine-readable label for the failure.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthRequired => "auth_required",
            Self::EmptyCart => "empty_cart",
            Self::CheckoutInProgress => "checkout_in_progress",
            Self::NetworkFailure(_) => "network_failure",
            Self::ServerRejected { .. } => "server_rejected",
            Self::Decode(_) => "decode_error",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Whether the user has to sign in before retrying.
    #[must_use]
    pub const fn requires_sign_in(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// Reason suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NetworkFailure(_) => {
                "A server or network error occurred. Please try again.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<ApiError> for CheckoutError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => Self::NetworkFailure(e.to_string()),
            ApiError::Api { status, message } => Self::ServerRejected { status, message },
            ApiError::Decode(message) => Self::Decode(message),
            ApiError::InvalidInput(message) => Self::InvalidRequest(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_error_kinds() {
        assert_eq!(CheckoutError::AuthRequired.kind(), "auth_required");
        assert_eq!(CheckoutError::EmptyCart.kind(), "empty_cart");
        assert_eq!(
            CheckoutError::ServerRejected {
                status: 400,
                message: "Out of stock".to_string()
            }
            .kind(),
            "server_rejected"
        );
    }

    #[test]
    fn test_server_rejected_displays_server_message() {
        let err = CheckoutError::from(ApiError::Api {
            status: 409,
            message: "Insufficient stock for Mug".to_string(),
        });
        assert_eq!(err.user_message(), "Insufficient stock for Mug");
        assert!(matches!(err, CheckoutError::ServerRejected { status: 409, .. }));
    }

    #[test]
    fn test_network_failure_hides_transport_details() {
        let err = CheckoutError::NetworkFailure("connection refused".to_string());
        assert!(!err.user_message().contains("refused"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_invalid_input_is_not_a_network_failure() {
        let err = CheckoutError::from(ApiError::InvalidInput("product id is empty".to_string()));
        assert_eq!(err, CheckoutError::InvalidRequest("product id is empty".to_string()));
        assert_eq!(err.kind(), "invalid_request");
        assert_eq!(err.user_message(), "Request not sent: product id is empty");
        assert!(!err.requires_sign_in());
    }

    #[test]
    fn test_only_auth_required_needs_sign_in() {
        assert!(CheckoutError::AuthRequired.requires_sign_in());
        assert!(!CheckoutError::EmptyCart.requires_sign_in());
    }
}
