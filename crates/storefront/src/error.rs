//! Unified error type for client workflows.
//!
//! Each boundary has its own error ([`ConfigError`], [`StoreError`],
//! [`ApiError`], [`CheckoutError`]); [`AppError`] collects them for callers
//! that drive whole workflows, such as the CLI.

use thiserror::Error;

use lifestyle_store_core::{EmailError, ProductId};

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::services::CheckoutError;
use crate::store::StoreError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// The profile directory could not be opened or flushed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// REST backend call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Order placement failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Email address rejected before contacting the backend.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Requested quantity exceeds available stock.
    #[error("Only {available} left in stock for product {product_id}")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
    },

    /// The backend answered successfully but without the expected data.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The operation requires a signed-in user.
    #[error("Not signed in")]
    NotSignedIn,
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
