use crate::cart::{Cart, CartError};

/// Wherever the shopper's cart is kept between interactions.
///
/// Reconciliation holds a `CartStore` so that it can clear the cart when, and only when, a payment is confirmed.
pub trait CartStore {
    fn load(&self) -> Result<Cart, CartError>;

    fn save(&self, cart: &Cart) -> Result<(), CartError>;

    fn clear(&self) -> Result<(), CartError> {
        self.save(&Cart::default())
    }
}
