//! The shopper's cart.
//!
//! The cart is held on the client and is entirely separate from any order. Placing an order copies the cart's lines
//! into the request but never modifies the cart; the only thing that empties it during checkout is a confirmed
//! payment.
use gaura_common::Money;
use log::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkout_types::{CartLineItem, ProductId};

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("A cart line must have a quantity of at least one")]
    InvalidQuantity,
    #[error("Product {0} is not in the cart")]
    ItemNotFound(ProductId),
    #[error("Could not access the stored cart. {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `item` to the cart. If the product is already present, the quantities are merged and the existing line's
    /// name and price are kept.
    pub fn add_item(&mut self, item: CartLineItem) -> Result<(), CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.checked_add(item.quantity).ok_or(CartError::InvalidQuantity)?;
                debug!("🛒️ {} now has quantity {}", existing.product_id, existing.quantity);
            },
            None => {
                debug!("🛒️ Added {} x {} to cart", item.quantity, item.product_id);
                self.items.push(item);
            },
        }
        Ok(())
    }

    /// Sets the quantity of a line. Setting the quantity to zero removes the line.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(product_id).map(|_| ());
        }
        let line = self
            .items
            .iter_mut()
            .find(|i| &i.product_id == product_id)
            .ok_or_else(|| CartError::ItemNotFound(product_id.clone()))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &ProductId) -> Result<CartLineItem, CartError> {
        let pos = self
            .items
            .iter()
            .position(|i| &i.product_id == product_id)
            .ok_or_else(|| CartError::ItemNotFound(product_id.clone()))?;
        Ok(self.items.remove(pos))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// The number of units in the cart, i.e. the sum of all line quantities.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }
}

impl From<Vec<CartLineItem>> for Cart {
    fn from(items: Vec<CartLineItem>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod test {
    use rust_decimal_macros::dec;

    use super::*;

    fn incense(qty: u32) -> CartLineItem {
        CartLineItem::new("p1", "Sandalwood Incense", qty, Money::from(dec!(10.00)))
    }

    #[test]
    fn adding_merges_quantities() {
        let mut cart = Cart::new();
        cart.add_item(incense(1)).unwrap();
        cart.add_item(incense(2)).unwrap();
        cart.add_item(CartLineItem::new("p2", "Tulsi Mala", 1, Money::from(dec!(4.50)))).unwrap();
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total(), Money::from(dec!(34.50)));
        assert!(matches!(cart.add_item(incense(0)), Err(CartError::InvalidQuantity)));
    }

    #[test]
    fn merged_quantity_cannot_overflow() {
        let mut cart = Cart::new();
        cart.add_item(incense(u32::MAX)).unwrap();
        assert!(matches!(cart.add_item(incense(u32::MAX)), Err(CartError::InvalidQuantity)));
        assert!(matches!(cart.add_item(incense(1)), Err(CartError::InvalidQuantity)));
        assert_eq!(cart.item_count(), u32::MAX);
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn updating_and_removing() {
        let mut cart = Cart::from(vec![incense(2)]);
        let p1 = ProductId::from("p1");
        cart.update_quantity(&p1, 5).unwrap();
        assert_eq!(cart.item_count(), 5);
        cart.update_quantity(&p1, 0).unwrap();
        assert!(cart.is_empty());
        let err = cart.update_quantity(&p1, 1).unwrap_err();
        assert!(matches!(err, CartError::ItemNotFound(id) if id == p1));
        assert!(cart.remove_item(&p1).is_err());
    }

    #[test]
    fn empty_cart_totals_zero() {
        let cart = Cart::new();
        assert_eq!(cart.total(), Money::ZERO);
        assert_eq!(cart.item_count(), 0);
    }
}
