//! Command implementations.
//!
//! Each command drives a [`Storefront`](lifestyle_store_storefront::Storefront)
//! and prints plain text to stdout. Logs go to stderr.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod order;

use thiserror::Error;

use lifestyle_store_storefront::AppError;

/// Errors raised by CLI commands on top of the library's own.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    App(#[from] AppError),

    /// Reading interactive input failed.
    #[error("Failed to read input: {0}")]
    Input(#[from] std::io::Error),

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("No saved address with id {0}")]
    UnknownAddress(i64),

    #[error("No saved shipping address; add one before checking out")]
    NoAddress,
}

/// Convert a library error raised inside a command.
impl From<lifestyle_store_storefront::api::ApiError> for CommandError {
    fn from(e: lifestyle_store_storefront::api::ApiError) -> Self {
        Self::App(AppError::Api(e))
    }
}
