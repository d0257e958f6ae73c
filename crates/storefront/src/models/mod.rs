//! Client-held state models.
//!
//! These are the values the managers in [`crate::services`] own and persist:
//! the cart's line items and the signed-in identity.

pub mod cart;
pub mod session;

pub use cart::{Cart, CartLineItem};
pub use session::SessionUser;
