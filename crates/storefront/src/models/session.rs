//! Session-related types.
//!
//! Types persisted for the signed-in identity.

use serde::{Deserialize, Serialize};

use lifestyle_store_core::UserId;

/// Signed-in user identity.
///
/// Minimal data kept locally to identify the user and to attach a user id
/// to orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Backend user ID.
    pub id: UserId,
    /// Display name chosen at registration.
    pub username: String,
    /// Email address as returned by the backend.
    pub email: String,
}
