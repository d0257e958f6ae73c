//! Lifestyle Store Core - Shared types library.
//!
//! This crate provides common types used across all Lifestyle Store components:
//! - `storefront` - Cart/session state managers and the REST API client
//! - `cli` - Command-line front end driving the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no persistence, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
