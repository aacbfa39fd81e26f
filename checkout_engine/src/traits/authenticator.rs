use gaura_common::Secret;
use thiserror::Error;

use crate::checkout_types::AuthSession;

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Login failed. {0}")]
    LoginFailed(String),
}

#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn login(&self, email: &str, password: &Secret<String>) -> Result<AuthSession, AuthError>;
}
