//! Gaura Naturals checkout engine
//!
//! This library holds the storefront's checkout logic: turning the shopper's cart into an order, handing the shopper
//! to the payment provider's hosted checkout page, and working out what happened once they come back. It is
//! provider-agnostic and does no I/O of its own. Every external system is reached through the traits in [`traits`].
//!
//! The library is divided into these main sections:
//! 1. The data model ([`checkout_types`]) and the shopper's [`cart`].
//! 2. The checkout API ([`mod@checkout_api`]). [`CheckoutFlowApi`] places orders and opens payment sessions.
//!    [`ReconciliationPoller`] confirms payments by polling the provider with a bounded number of attempts, and
//!    [`ReconciliationHandle`] runs it in the background so that it can be torn down at any time.
//! 3. Route access control ([`access`]), evaluated against an explicitly supplied [`checkout_types::AuthSession`].
//!
//! The engine also emits events when a payment is confirmed and when a reconciliation finishes. A small actor
//! framework ([`events`]) lets you hook into these to notify the shopper or anything else.
pub mod access;
pub mod cart;
pub mod checkout_api;
pub mod checkout_types;
pub mod events;
pub mod helpers;
pub mod stores;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use checkout_api::{
    checkout_flow_api::CheckoutFlowApi,
    errors::CheckoutError,
    poller::{ReconciliationHandle, ReconciliationPoller},
    reconciliation::{Outcome, PollPolicy, Progress, Reconciliation, ReconciliationState, Step},
};
