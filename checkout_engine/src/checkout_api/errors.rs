use thiserror::Error;

use crate::{
    cart::CartError,
    traits::{OrderStoreError, PaymentGatewayError},
};

#[derive(Debug, Clone, Error)]
pub enum CheckoutError {
    #[error("Cannot place an order for an empty cart")]
    EmptyCart,
    #[error("The order could not be created. {0}")]
    OrderCreation(OrderStoreError),
    #[error("The payment session could not be created. {0}")]
    SessionCreation(PaymentGatewayError),
    #[error("Could not fetch order history. {0}")]
    OrderHistory(OrderStoreError),
    #[error("Cart error. {0}")]
    Cart(#[from] CartError),
}
