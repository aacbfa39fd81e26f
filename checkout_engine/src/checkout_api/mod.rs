//! # Checkout API
//!
//! * [`checkout_flow_api`] turns a cart and shipping address into an order, and an order into a hosted payment
//!   session. It also gives access to the shopper's order history.
//! * [`reconciliation`] is the pure payment reconciliation state machine. It decides what happens next, but never does
//!   any I/O itself.
//! * [`poller`] drives the state machine against a [`crate::traits::PaymentGateway`] and owns the lifecycle of a
//!   running reconciliation, including teardown.
//!
//! Like the rest of the engine, every API here is created by supplying implementations of the collaborator traits in
//! [`crate::traits`].
pub mod checkout_flow_api;
pub mod errors;
pub mod poller;
pub mod reconciliation;
