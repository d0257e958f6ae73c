//! Checkout: submit the cart as an order.
//!
//! The cart is cleared only after the backend confirms the order, and in the
//! same call. A failed submission leaves it exactly as it was.

use thiserror::Error;
use tracing::{info, instrument};

use lifestyle_store_core::{PaymentMethod, UserId};

use crate::api::types::{Address, OrderConfirmation, OrderItem, OrderRequest};
use crate::api::{ApiClient, ApiError};
use crate::models::Cart;
use crate::services::{CartManager, SessionManager};

/// Reasons an order could not be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Sign in to place an order")]
    NotSignedIn,
    #[error("Cart is empty")]
    EmptyCart,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Build the order body for `cart`.
#[must_use]
pub fn order_request(
    cart: &Cart,
    user_id: UserId,
    shipping_address: &Address,
    payment_method: PaymentMethod,
) -> OrderRequest {
    OrderRequest {
        user_id,
        items: cart
            .items()
            .iter()
            .map(|item| OrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.unit_price,
            })
            .collect(),
        shipping_address: shipping_address.clone(),
        payment_method,
        total: cart.total_price().round_to_cents(),
    }
}

/// Submit the current cart as an order for the signed-in user.
///
/// # Errors
///
/// Returns [`CheckoutError::NotSignedIn`] without a session,
/// [`CheckoutError::EmptyCart`] for an empty cart, or the API error if the
/// backend rejects the order. The cart is untouched on error.
#[instrument(skip_all, fields(payment_method = %payment_method))]
pub async fn place_order(
    api: &ApiClient,
    cart: &mut CartManager,
    session: &SessionManager,
    shipping_address: &Address,
    payment_method: PaymentMethod,
) -> Result<OrderConfirmation, CheckoutError> {
    let user = session.current_user().ok_or(CheckoutError::NotSignedIn)?;
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let request = order_request(cart.cart(), user.id, shipping_address, payment_method);
    let confirmation = api
        .authorized(session.credential())
        .create_order(&request)
        .await?;

    info!(
        order_id = %confirmation.order_id,
        total = %request.total,
        lines = request.items.len(),
        "Order placed"
    );
    cart.clear();

    Ok(confirmation)
}

/// The address to preselect at checkout: the one flagged default, else the
/// first.
#[must_use]
pub fn default_address(addresses: &[Address]) -> Option<&Address> {
    addresses
        .iter()
        .find(|a| a.is_default)
        .or_else(|| addresses.first())
}
