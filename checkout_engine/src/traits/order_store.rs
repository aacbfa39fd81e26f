use thiserror::Error;

use crate::checkout_types::{NewOrder, Order, OrderId};

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("The order store could not be reached. {0}")]
    Unreachable(String),
    #[error("The order store rejected the request ({status}). {message}")]
    Rejected { status: u16, message: String },
    #[error("Not authorized to access orders. {0}")]
    Unauthorized(String),
    #[error("The order store sent a response we could not understand. {0}")]
    InvalidResponse(String),
}

/// Order creation and lookup.
///
/// The store is the sole authority on an order's contents and total. Implementations must not retry on failure; the
/// checkout flow surfaces every failure to the shopper directly.
#[allow(async_fn_in_trait)]
pub trait OrderStore {
    /// Submits `order` and returns the order as created by the store, including its new id and computed total.
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;

    /// Fetches the current shopper's orders, newest first.
    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderStoreError>;

    /// Fetches a single order. Returns `Ok(None)` if the store does not know about the order.
    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;
}
