//! Cart state manager.
//!
//! Owns the [`Cart`] for the lifetime of a profile session. Every mutation
//! that changes the cart is written to the [`Store`] and then announced to
//! subscribers before the call returns. Nothing here touches the network.

use tracing::{error, info, instrument, warn};

use lifestyle_store_core::{Money, ProductId};

use crate::api::types::Product;
use crate::models::{Cart, CartLineItem};
use crate::observer::{Observers, SubscriptionId};
use crate::store::{Store, StoreError, StoreKey};

/// Owns the cart, persists it and notifies views of changes.
#[derive(Debug)]
pub struct CartManager {
    store: Store,
    cart: Cart,
    observers: Observers<Cart>,
}

impl CartManager {
    /// Rehydrate the cart from `store`.
    ///
    /// A missing or unusable snapshot yields an empty cart. Lines that break
    /// the cart's invariants are repaired and the repaired cart is written
    /// back.
    #[must_use]
    pub fn open(store: Store) -> Self {
        let mut cart: Cart = store.load(StoreKey::Cart).unwrap_or_default();

        let repaired = cart.normalize();
        if repaired > 0 {
            warn!(repaired, "Repaired stored cart lines");
        }

        let manager = Self {
            store,
            cart,
            observers: Observers::default(),
        };
        if repaired > 0 {
            manager.persist();
        }
        info!(
            lines = manager.cart.items().len(),
            total_items = manager.cart.total_items(),
            "Cart loaded"
        );
        manager
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Line items in display order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        self.cart.items()
    }

    /// The line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: ProductId) -> Option<&CartLineItem> {
        self.cart.get(product_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.total_items()
    }

    /// Sum of `unit_price × quantity` across all lines.
    #[must_use]
    pub fn total_price(&self) -> Money {
        self.cart.total_price()
    }

    /// Owned copy of the current cart, e.g. for building an order.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.cart.clone()
    }

    /// Add one unit of `product`.
    pub fn add_one(&mut self, product: &Product) {
        self.add_item(product, 1);
    }

    /// Add `quantity` units of `product`, merging with an existing line.
    ///
    /// There is no upper bound here; stock limits are the caller's concern
    /// (see [`Product::can_fulfil`]).
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        let changed = self.cart.add(product, quantity);
        self.commit(changed);
    }

    /// Set the quantity of a line; values below 1 remove it.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, product_id: ProductId, new_quantity: i64) {
        let changed = self.cart.set_quantity(product_id, new_quantity);
        self.commit(changed);
    }

    /// Remove the line for `product_id`, if present.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, product_id: ProductId) {
        let changed = self.cart.remove(product_id);
        self.commit(changed);
    }

    /// Remove every line.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        let changed = self.cart.clear();
        self.commit(changed);
    }

    /// Register a callback invoked with the cart after every change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Cart) + Send + 'static,
    {
        self.observers.subscribe(callback)
    }

    /// Remove a callback registered with [`Self::subscribe`].
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Write the current cart to the store.
    ///
    /// Mutations already persist themselves; call this on teardown to make
    /// sure the last state is on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.store.save(StoreKey::Cart, &self.cart)
    }

    fn commit(&mut self, changed: bool) {
        if !changed {
            return;
        }
        self.persist();
        self.observers.notify(&self.cart);
    }

    fn persist(&self) {
        if let Err(e) = self.flush() {
            error!(error = %e, "Failed to persist cart");
        }
    }
}
