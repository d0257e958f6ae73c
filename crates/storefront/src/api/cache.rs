//! Cache types for catalog responses.

use crate::api::types::{Category, Product};

/// Cache key for catalog listings.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Categories(Vec<Category>),
}
