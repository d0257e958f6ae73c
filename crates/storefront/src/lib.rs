//! Lifestyle Store client library.
//!
//! Client-side state for the Lifestyle Store: a persisted, observable cart, the
//! signed-in session and a typed client for the REST backend. Front ends (the
//! CLI, tests) construct a [`state::Storefront`] and drive it.
//!
//! # Modules
//!
//! - [`store`] - Versioned key-value persistence (file or memory)
//! - [`services`] - Cart and session managers, checkout
//! - [`api`] - REST backend client
//! - [`catalog`] - Client-side product filtering and sorting

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod observer;
pub mod services;
pub mod state;
pub mod store;

pub use error::{AppError, Result};
pub use state::Storefront;
