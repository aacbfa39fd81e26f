use gaura_common::Money;
use log::*;

use crate::{
    cart::Cart,
    checkout_types::{CartLineItem, ShippingAddress},
};

pub fn prepare_test_env() {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
}

/// Two sticks of incense at $10.00 each.
pub fn sample_cart() -> Cart {
    Cart::from(vec![CartLineItem::new("p1", "Sandalwood Incense", 2, Money::from_cents(1000))])
}

pub fn sample_address() -> ShippingAddress {
    ShippingAddress {
        address: "12 Parikrama Marg".into(),
        city: "Vrindavan".into(),
        state: "Uttar Pradesh".into(),
        zip: "281121".into(),
        country: "India".into(),
    }
}
