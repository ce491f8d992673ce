//! MyStore Core - Shared types library.
//!
//! This crate provides common types used across all MyStore components:
//! - `cart` - Cart store, totals, session and checkout core
//! - `cli` - Command-line front end over the cart core
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and session tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
