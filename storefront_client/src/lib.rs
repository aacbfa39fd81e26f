//! A `reqwest` client for the storefront's REST API.
//!
//! [`StorefrontApi`] implements the checkout engine's [`checkout_engine::traits::OrderStore`],
//! [`checkout_engine::traits::PaymentGateway`] and [`checkout_engine::traits::Authenticator`] traits, so it can be
//! handed straight to a [`checkout_engine::CheckoutFlowApi`] or [`checkout_engine::ReconciliationPoller`].
mod api;
mod config;
mod data_objects;
mod error;

pub use api::StorefrontApi;
pub use config::StorefrontConfig;
pub use data_objects::{CheckoutSessionRequest, CheckoutSessionResponse, LoginRequest, LoginResponse};
pub use error::StorefrontApiError;
