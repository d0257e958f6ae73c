//! Cart line items and the rules that keep them consistent.
//!
//! [`Cart`] is plain data plus the mutation rules; persistence and change
//! notification are layered on top by [`crate::services::CartManager`].
//! Every mutator reports whether it changed anything so the manager can skip
//! writes and notifications for no-ops.
//!
//! A cart's total always fits in a [`Money`]: adds and quantity changes that
//! would overflow it are refused, and [`Cart::normalize`] drops stored lines
//! that do not fit.

use serde::{Deserialize, Serialize};

use lifestyle_store_core::{Money, ProductId};

use crate::api::types::Product;

/// One product-and-quantity entry in the cart.
///
/// The aliases accept line items stored by the earlier web client, which
/// spread the whole product record (`id`, `price`) into the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    pub name: String,
    #[serde(alias = "price")]
    pub unit_price: Money,
    /// Image URL.
    #[serde(default)]
    pub image: String,
    /// Always at least 1 while the line is in a cart.
    pub quantity: u32,
}

impl CartLineItem {
    /// `unit_price × quantity`, unrounded.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// Ordered line items; insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `unit_price × quantity`; zero for an empty cart.
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// A zero quantity, a negative price or an amount that would overflow
    /// the cart total is ignored.
    pub fn add(&mut self, product: &Product, quantity: u32) -> bool {
        if quantity == 0 || product.price.is_negative() {
            tracing::debug!(product_id = %product.id, quantity, "Ignoring malformed add");
            return false;
        }

        let (unit_price, merged) = match self.get(product.id) {
            Some(item) => (item.unit_price, item.quantity.saturating_add(quantity)),
            None => (product.price, quantity),
        };
        if total_with(&self.items, product.id, unit_price, merged).is_none() {
            tracing::debug!(product_id = %product.id, quantity, "Ignoring add that overflows the total");
            return false;
        }

        if let Some(item) = self.get_mut(product.id) {
            item.quantity = merged;
        } else {
            self.items.push(CartLineItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                image: product.image.clone(),
                quantity,
            });
        }
        true
    }

    /// Set the quantity of an existing line; below 1 removes the line.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        if quantity < 1 {
            return self.remove(product_id);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let Some(unit_price) = self
            .get(product_id)
            .filter(|item| item.quantity != quantity)
            .map(|item| item.unit_price)
        else {
            return false;
        };
        if total_with(&self.items, product_id, unit_price, quantity).is_none() {
            tracing::debug!(%product_id, quantity, "Ignoring quantity that overflows the total");
            return false;
        }

        match self.get_mut(product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove the line for `product_id`.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product_id != product_id);
        self.items.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        changed
    }

    /// Repair a cart read from storage.
    ///
    /// Drops lines with a zero quantity or negative price, folds duplicate
    /// product ids into the first occurrence and drops lines that would push
    /// the total out of range. Returns the number of lines dropped or merged.
    pub fn normalize(&mut self) -> usize {
        let before = self.items.len();
        let mut kept: Vec<CartLineItem> = Vec::with_capacity(before);

        for item in self.items.drain(..) {
            if item.quantity == 0 || item.unit_price.is_negative() {
                continue;
            }

            let existing = kept.iter().position(|k| k.product_id == item.product_id);
            let (unit_price, quantity) = match existing {
                Some(index) => (
                    kept[index].unit_price,
                    kept[index].quantity.saturating_add(item.quantity),
                ),
                None => (item.unit_price, item.quantity),
            };
            if total_with(&kept, item.product_id, unit_price, quantity).is_none() {
                tracing::warn!(product_id = %item.product_id, "Dropping stored line that overflows the total");
                continue;
            }

            match existing {
                Some(index) => kept[index].quantity = quantity,
                None => kept.push(item),
            }
        }

        self.items = kept;
        before - self.items.len()
    }

    fn get_mut(&mut self, product_id: ProductId) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id == product_id)
    }
}

/// Cart total if the line for `product_id` held `quantity` units at
/// `unit_price`, or `None` if any step leaves the decimal range.
fn total_with(
    items: &[CartLineItem],
    product_id: ProductId,
    unit_price: Money,
    quantity: u32,
) -> Option<Money> {
    items
        .iter()
        .filter(|item| item.product_id != product_id)
        .try_fold(unit_price.checked_mul(quantity)?, |total, item| {
            total.checked_add(item.unit_price.checked_mul(item.quantity)?)
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    use rust_decimal::Decimal;

    pub(crate) fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Money::from_cents(cents),
            image: format!("https://cdn.example.com/{id}.jpg"),
            category: "home".to_string(),
            rating: 4.5,
            is_new: false,
            stock: 10,
            description: None,
            original_price: None,
            discount: None,
            reviews: 0,
        }
    }

    #[test]
    fn test_repeated_adds_merge_into_one_line() {
        let mut cart = Cart::new();
        let a = product(1, 1000);

        for quantity in [2, 3, 1] {
            assert!(cart.add(&a, quantity));
        }

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(a.id).unwrap().quantity, 6);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut cart = Cart::new();
        cart.add(&product(3, 100), 1);
        cart.add(&product(1, 100), 1);
        cart.add(&product(3, 100), 1);

        let ids: Vec<i64> = cart.items().iter().map(|i| i.product_id.as_i64()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_malformed_adds_are_ignored() {
        let mut cart = Cart::new();
        assert!(!cart.add(&product(1, 1000), 0));
        assert!(!cart.add(&product(2, -1), 1));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_totals() {
        let mut cart = Cart::new();
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), Money::ZERO);

        cart.add(&product(2, 1999), 1);
        cart.add(&product(3, 500), 4);

        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price(), Money::from_cents(3999));
    }

    #[test]
    fn test_set_quantity_below_one_removes() {
        for quantity in [0, -1, i64::MIN] {
            let mut cart = Cart::new();
            cart.add(&product(1, 1000), 2);

            assert!(cart.set_quantity(ProductId::new(1), quantity));
            assert!(cart.is_empty());
            assert!(!cart.remove(ProductId::new(1)));
        }
    }

    #[test]
    fn test_set_quantity_on_missing_or_same_value_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1000), 2);

        assert!(!cart.set_quantity(ProductId::new(9), 4));
        assert!(!cart.set_quantity(ProductId::new(1), 2));
        assert!(cart.set_quantity(ProductId::new(1), 7));
        assert_eq!(cart.total_items(), 7);
    }

    #[test]
    fn test_clear_reports_change_once() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1000), 2);

        assert!(cart.clear());
        assert!(!cart.clear());
        assert_eq!(cart.total_price(), Money::ZERO);
    }

    #[test]
    fn test_adds_that_overflow_the_total_are_refused() {
        let mut huge = product(1, 0);
        huge.price = Money::new(Decimal::MAX);

        let mut cart = Cart::new();
        assert!(cart.add(&huge, 1));
        assert!(!cart.add(&huge, 1));
        assert!(!cart.add(&product(2, 100), 1));
        assert!(!cart.set_quantity(ProductId::new(1), 2));

        assert_eq!(cart.total_items(), 1);
        assert_eq!(cart.total_price(), huge.price);
    }

    #[test]
    fn test_normalize_drops_lines_that_overflow() {
        let mut cart: Cart = serde_json::from_str(
            r#"[
                {"product_id":1,"name":"A","unit_price":"10.00","quantity":2},
                {"product_id":2,"name":"B","unit_price":"50000000000000000000000000000","quantity":2},
                {"product_id":3,"name":"C","unit_price":"70000000000000000000000000000","quantity":1},
                {"product_id":4,"name":"D","unit_price":"20000000000000000000000000000","quantity":1}
            ]"#,
        )
        .unwrap();

        assert_eq!(cart.normalize(), 2);
        let ids: Vec<i64> = cart.items().iter().map(|i| i.product_id.as_i64()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(
            cart.total_price(),
            Money::new("70000000000000000000000000020".parse().unwrap())
        );
    }

    #[test]
    fn test_decodes_legacy_line_shape() {
        let cart: Cart = serde_json::from_str(
            r#"[{"id":5,"name":"Bamboo Tray","price":49.9,"image":"t.jpg","quantity":2,"category":"kitchen"}]"#,
        )
        .unwrap();

        let line = cart.get(ProductId::new(5)).unwrap();
        assert_eq!(line.unit_price, Money::from_cents(4990));
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn test_normalize_repairs_stored_cart() {
        let mut cart: Cart = serde_json::from_str(
            r#"[
                {"product_id":1,"name":"A","unit_price":"10.00","quantity":2},
                {"product_id":2,"name":"B","unit_price":"-1.00","quantity":1},
                {"product_id":1,"name":"A","unit_price":"10.00","quantity":3},
                {"product_id":3,"name":"C","unit_price":"5.00","quantity":0}
            ]"#,
        )
        .unwrap();

        assert_eq!(cart.normalize(), 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.get(ProductId::new(1)).unwrap().quantity, 5);
    }
}
