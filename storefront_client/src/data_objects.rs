use checkout_engine::checkout_types::{OrderId, PaymentSession, SessionId, UserProfile};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionRequest {
    pub order_id: OrderId,
    /// The storefront's origin. The backend appends `/order-success?session_id=...` to build the return URL.
    pub host_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSessionResponse {
    pub url: Url,
    pub session_id: SessionId,
}

impl CheckoutSessionResponse {
    pub fn into_session(self, order_id: OrderId) -> PaymentSession {
        PaymentSession { session_id: self.session_id, order_id, redirect_url: self.url }
    }
}

/// The body of an error response. `detail` is usually a message, but validation failures send a list of problems.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
