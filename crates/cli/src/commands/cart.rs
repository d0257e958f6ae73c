//! Cart commands.
//!
//! Mutating commands subscribe to the cart before changing it, so the
//! summary printed is exactly what subscribers were told.

use lifestyle_store_core::{CurrencyCode, ProductId};
use lifestyle_store_storefront::Storefront;
use lifestyle_store_storefront::models::Cart;

use super::CommandError;

/// Print every line and the totals.
#[allow(clippy::print_stdout)]
pub fn show(shop: &Storefront) {
    let cart = shop.cart();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in cart.items() {
        println!(
            "#{:<5} {:<32} {:>4} x {:>10} = {:>10}",
            item.product_id.as_i64(),
            item.name,
            item.quantity,
            item.unit_price.display(CurrencyCode::default()),
            item.line_total().display(CurrencyCode::default()),
        );
    }
    println!("{}", totals(cart.cart()));
}

/// Add `quantity` units of product `id`.
pub async fn add(shop: &mut Storefront, id: ProductId, quantity: u32) -> Result<(), CommandError> {
    watch(shop);
    let product = shop.add_to_cart(id, quantity).await?;
    tracing::info!(product = %product.name, quantity, "Added to cart");
    Ok(())
}

/// Set the quantity of product `id`.
#[allow(clippy::print_stdout)]
pub fn set(shop: &mut Storefront, id: ProductId, quantity: i64) {
    if shop.cart().get(id).is_none() {
        println!("Product {id} is not in your cart.");
        return;
    }
    watch(shop);
    shop.cart_mut().update_quantity(id, quantity);
}

/// Remove product `id`.
#[allow(clippy::print_stdout)]
pub fn remove(shop: &mut Storefront, id: ProductId) {
    if shop.cart().get(id).is_none() {
        println!("Product {id} is not in your cart.");
        return;
    }
    watch(shop);
    shop.cart_mut().remove_item(id);
}

/// Empty the cart.
pub fn clear(shop: &mut Storefront) {
    watch(shop);
    shop.cart_mut().clear();
}

/// Print a totals line whenever the cart changes.
#[allow(clippy::print_stdout)]
fn watch(shop: &mut Storefront) {
    shop.cart_mut().subscribe(|cart: &Cart| println!("{}", totals(cart)));
}

fn totals(cart: &Cart) -> String {
    format!(
        "{} item(s), total {}",
        cart.total_items(),
        cart.total_price().display(CurrencyCode::default())
    )
}
