//! Cache types for catalog responses.

use mystore_core::ProductId;

use super::Product;

/// Cache key for catalog lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
}
