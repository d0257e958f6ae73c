//! Checkout and shipment tracking commands.

use lifestyle_store_core::{CurrencyCode, PaymentMethod};
use lifestyle_store_storefront::Storefront;
use lifestyle_store_storefront::services::default_address;

use super::CommandError;

/// Place an order for the cart, shipping to `address_id` or the default
/// address.
#[allow(clippy::print_stdout)]
pub async fn checkout(
    shop: &mut Storefront,
    payment: PaymentMethod,
    address_id: Option<i64>,
) -> Result<(), CommandError> {
    let addresses = shop.addresses().await?;
    let address = match address_id {
        Some(id) => addresses
            .iter()
            .find(|a| a.id.as_i64() == id)
            .ok_or(CommandError::UnknownAddress(id))?,
        None => default_address(&addresses).ok_or(CommandError::NoAddress)?,
    };

    let total = shop.cart().total_price();
    let confirmation = shop.checkout(address, payment).await?;

    println!(
        "Order #{} placed ({}), {} via {payment}",
        confirmation.order_id,
        confirmation.status,
        confirmation
            .total
            .unwrap_or(total)
            .display(CurrencyCode::default()),
    );
    println!("Shipping to {}", address.one_line());
    Ok(())
}

/// Print a shipment's status and timeline.
#[allow(clippy::print_stdout)]
pub async fn track(shop: &Storefront, tracking_number: &str) -> Result<(), CommandError> {
    let shipment = shop.api().track_shipment(tracking_number).await?;

    println!(
        "{} via {} - {}",
        shipment.tracking_number, shipment.carrier, shipment.status
    );
    if let Some(eta) = shipment.estimated_delivery {
        println!("  estimated delivery {}", eta.format("%Y-%m-%d"));
    }

    let mut records: Vec<_> = shipment.tracking_records.iter().collect();
    records.sort_by_key(|r| r.timestamp);
    for record in records {
        println!(
            "  {}  {:<16} {}{}",
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.status.to_string(),
            record.description,
            record
                .location
                .as_deref()
                .map(|l| format!(" ({l})"))
                .unwrap_or_default(),
        );
    }
    Ok(())
}
