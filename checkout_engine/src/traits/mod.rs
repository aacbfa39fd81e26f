//! # Collaborator contracts
//!
//! The checkout core never talks to the network or to storage directly. Everything it needs from the outside world is
//! expressed as one of the traits below, and concrete implementations are injected by the caller.
//!
//! * [`OrderStore`] creates and fetches orders. Orders are never modified by this crate once created.
//! * [`PaymentGateway`] opens hosted payment sessions and reports their status.
//! * [`CartStore`] is the explicitly scoped cart context: wherever the shopper's cart lives between runs.
//! * [`Authenticator`] exchanges credentials for an [`crate::checkout_types::AuthSession`].
//! * [`Scheduler`] provides the only suspension point in payment reconciliation, the delay between polls.
mod authenticator;
mod cart_store;
mod order_store;
mod payment_gateway;
mod scheduler;

pub use authenticator::{AuthError, Authenticator};
pub use cart_store::CartStore;
pub use order_store::{OrderStore, OrderStoreError};
pub use payment_gateway::{PaymentGateway, PaymentGatewayError};
pub use scheduler::{Scheduler, TokioScheduler};
