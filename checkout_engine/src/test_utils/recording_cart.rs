use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crate::{
    cart::{Cart, CartError},
    stores::MemoryCartStore,
    traits::CartStore,
};

/// An in-memory cart store that counts how many times it has been cleared.
#[derive(Debug, Clone, Default)]
pub struct RecordingCartStore {
    cart: MemoryCartStore,
    clears: Arc<AtomicU32>,
}

impl RecordingCartStore {
    pub fn new(cart: Cart) -> Self {
        Self { cart: MemoryCartStore::new(cart), clears: Arc::default() }
    }

    pub fn clear_count(&self) -> u32 {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn cart(&self) -> Cart {
        self.cart.load().unwrap_or_default()
    }
}

impl CartStore for RecordingCartStore {
    fn load(&self) -> Result<Cart, CartError> {
        self.cart.load()
    }

    fn save(&self, cart: &Cart) -> Result<(), CartError> {
        self.cart.save(cart)
    }

    fn clear(&self) -> Result<(), CartError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.cart.clear()
    }
}
