use std::sync::{Arc, PoisonError, RwLock};

use crate::{
    cart::{Cart, CartError},
    traits::CartStore,
};

/// A cart that lives only as long as the process. Clones share the same cart.
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    cart: Arc<RwLock<Cart>>,
}

impl MemoryCartStore {
    pub fn new(cart: Cart) -> Self {
        Self { cart: Arc::new(RwLock::new(cart)) }
    }
}

impl CartStore for MemoryCartStore {
    fn load(&self) -> Result<Cart, CartError> {
        Ok(self.cart.read().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, cart: &Cart) -> Result<(), CartError> {
        *self.cart.write().unwrap_or_else(PoisonError::into_inner) = cart.clone();
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use gaura_common::Money;

    use super::*;
    use crate::checkout_types::CartLineItem;

    #[test]
    fn clones_share_the_cart() {
        let store = MemoryCartStore::default();
        let other = store.clone();
        let mut cart = store.load().unwrap();
        cart.add_item(CartLineItem::new("p1", "Ghee Lamp", 1, Money::from(6u32))).unwrap();
        store.save(&cart).unwrap();
        assert_eq!(other.load().unwrap().item_count(), 1);
        other.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
