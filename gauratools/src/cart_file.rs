use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use checkout_engine::{
    cart::{Cart, CartError},
    traits::CartStore,
};
use log::*;

/// Keeps the cart in a JSON file between invocations.
///
/// A missing file is an empty cart. Saves go to a sibling temporary file first and are then renamed over the cart, so
/// an interrupted save never leaves a half-written cart behind.
#[derive(Debug, Clone)]
pub struct JsonFileCartStore {
    path: PathBuf,
}

impl JsonFileCartStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CartStore for JsonFileCartStore {
    fn load(&self) -> Result<Cart, CartError> {
        match fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(Cart::default()),
            Ok(s) => serde_json::from_str(&s)
                .map_err(|e| CartError::Storage(format!("{} is not a valid cart. {e}", self.path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                trace!("🛒️ No cart file at {}. Starting with an empty cart.", self.path.display());
                Ok(Cart::default())
            },
            Err(e) => Err(CartError::Storage(e.to_string())),
        }
    }

    fn save(&self, cart: &Cart) -> Result<(), CartError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| CartError::Storage(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(cart).map_err(|e| CartError::Storage(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| CartError::Storage(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| CartError::Storage(e.to_string()))?;
        trace!("🛒️ Cart saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use checkout_engine::checkout_types::CartLineItem;
    use gaura_common::Money;

    use super::*;

    #[test]
    fn missing_file_is_an_empty_cart() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCartStore::new(dir.path().join("cart.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn cart_survives_a_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileCartStore::new(dir.path().join("nested").join("cart.json"));
        let mut cart = Cart::new();
        cart.add_item(CartLineItem::new("p1", "Sandalwood Incense", 2, Money::from_cents(1000))).unwrap();
        store.save(&cart).unwrap();
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"price\": 10.0"));
        assert_eq!(store.load().unwrap(), cart);
        store.clear().unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        fs::write(&path, "{not json").unwrap();
        let err = JsonFileCartStore::new(path).load().unwrap_err();
        assert!(matches!(err, CartError::Storage(_)));
    }
}
