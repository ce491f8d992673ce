//! Core types for MyStore.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod id;
pub mod price;

pub use credential::SessionToken;
pub use id::*;
pub use price::{PriceError, format_price, parse_price_text, round_money};
