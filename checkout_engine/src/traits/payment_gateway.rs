use std::future::Future;

use thiserror::Error;
use url::Url;

use crate::checkout_types::{OrderId, PaymentSession, SessionId, SessionStatus};

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayError {
    #[error("The payment provider could not be reached. {0}")]
    Unreachable(String),
    #[error("The payment provider rejected the request ({status}). {message}")]
    Rejected { status: u16, message: String },
    #[error("Not authorized to access payment sessions. {0}")]
    Unauthorized(String),
    #[error("The payment provider sent a response we could not understand. {0}")]
    InvalidResponse(String),
}

/// Hosted-checkout sessions.
///
/// The status query runs inside the spawned reconciliation task, so its future must be `Send`.
pub trait PaymentGateway {
    /// Opens a payment session for `order_id`. `host_url` is the application's origin, which the provider uses to
    /// build the return URL the shopper is sent back to after paying.
    fn create_session(
        &self,
        order_id: &OrderId,
        host_url: &Url,
    ) -> impl Future<Output = Result<PaymentSession, PaymentGatewayError>> + Send;

    /// Reports what the provider currently knows about the session.
    fn session_status(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<SessionStatus, PaymentGatewayError>> + Send;
}
