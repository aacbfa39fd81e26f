use std::fmt::Debug;

use log::*;
use url::Url;

use crate::{
    cart::Cart,
    checkout_api::errors::CheckoutError,
    checkout_types::{CheckoutStarted, NewOrder, Order, OrderId, PaymentSession, ShippingAddress},
    traits::{OrderStore, PaymentGateway},
};

/// `CheckoutFlowApi` takes the shopper from a filled cart to a hosted payment page.
///
/// It is made up of two steps that must happen in order:
/// 1. [`Self::place_order`] builds the order intent from the cart and submits it to the order store.
/// 2. [`Self::open_payment_session`] opens a payment session for the new order. The caller hands the returned redirect
///    URL to the shopper, and control only comes back when the provider sends the shopper to the return URL.
///
/// Neither step touches the cart. The cart is cleared by payment reconciliation once the payment has been confirmed.
pub struct CheckoutFlowApi<O, G> {
    orders: O,
    gateway: G,
}

impl<O, G> Debug for CheckoutFlowApi<O, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutFlowApi")
    }
}

impl<O, G> CheckoutFlowApi<O, G> {
    pub fn new(orders: O, gateway: G) -> Self {
        Self { orders, gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}

impl<O, G> CheckoutFlowApi<O, G>
where
    O: OrderStore,
    G: PaymentGateway,
{
    /// Submits an order for everything in `cart`, shipped to `address`, and returns the id the store assigned to it.
    ///
    /// The address is not validated here; see [`ShippingAddress::validate`]. An empty cart is refused without
    /// contacting the store. Any failure from the store is returned as [`CheckoutError::OrderCreation`] and nothing
    /// else is attempted.
    pub async fn place_order(&self, cart: &Cart, address: &ShippingAddress) -> Result<OrderId, CheckoutError> {
        if cart.is_empty() {
            warn!("📦️ Refusing to place an order for an empty cart");
            return Err(CheckoutError::EmptyCart);
        }
        let order = NewOrder::new(cart.items().to_vec(), address.clone());
        let expected = order.expected_total();
        let created = self.orders.create_order(order).await.map_err(|e| {
            warn!("📦️ Order creation failed. {e}");
            CheckoutError::OrderCreation(e)
        })?;
        if created.total != expected {
            warn!("📦️ Order {} was created with total {}, but the cart totals {expected}", created.id, created.total);
        }
        info!("📦️ Order {} created for {} items totalling {}", created.id, created.item_count(), created.total);
        Ok(created.id)
    }

    /// Opens a hosted payment session for `order_id`.
    ///
    /// On failure the order remains in the store, unpaid, and no reconciliation should be started.
    pub async fn open_payment_session(
        &self,
        order_id: &OrderId,
        host_url: &Url,
    ) -> Result<PaymentSession, CheckoutError> {
        let session = self.gateway.create_session(order_id, host_url).await.map_err(|e| {
            warn!("💳️ Could not open a payment session for order {order_id}. {e}");
            CheckoutError::SessionCreation(e)
        })?;
        info!("💳️ Payment session {} opened for order {order_id}", session.session_id);
        debug!("💳️ Shopper must be sent to {}", session.redirect_url);
        Ok(session)
    }

    /// Places the order and opens its payment session. If the order cannot be placed, no session is requested.
    pub async fn begin_checkout(
        &self,
        cart: &Cart,
        address: &ShippingAddress,
        host_url: &Url,
    ) -> Result<CheckoutStarted, CheckoutError> {
        let order_id = self.place_order(cart, address).await?;
        let session = self.open_payment_session(&order_id, host_url).await?;
        Ok(CheckoutStarted { order_id, session })
    }

    /// The shopper's orders, newest first.
    pub async fn order_history(&self) -> Result<Vec<Order>, CheckoutError> {
        let orders = self.orders.fetch_orders().await.map_err(CheckoutError::OrderHistory)?;
        trace!("📦️ Fetched {} orders", orders.len());
        Ok(orders)
    }

    pub async fn order(&self, order_id: &OrderId) -> Result<Option<Order>, CheckoutError> {
        self.orders.fetch_order(order_id).await.map_err(CheckoutError::OrderHistory)
    }
}
