use checkout_engine::traits::{AuthError, OrderStoreError, PaymentGatewayError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StorefrontApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
}

impl StorefrontApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::QueryError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

impl From<StorefrontApiError> for OrderStoreError {
    fn from(e: StorefrontApiError) -> Self {
        match e {
            StorefrontApiError::QueryError { status: 401 | 403, message } => Self::Unauthorized(message),
            StorefrontApiError::QueryError { status, message } => Self::Rejected { status, message },
            StorefrontApiError::JsonError(s) => Self::InvalidResponse(s),
            StorefrontApiError::Initialization(s) | StorefrontApiError::RestResponseError(s) => Self::Unreachable(s),
        }
    }
}

impl From<StorefrontApiError> for PaymentGatewayError {
    fn from(e: StorefrontApiError) -> Self {
        match e {
            StorefrontApiError::QueryError { status: 401 | 403, message } => Self::Unauthorized(message),
            StorefrontApiError::QueryError { status, message } => Self::Rejected { status, message },
            StorefrontApiError::JsonError(s) => Self::InvalidResponse(s),
            StorefrontApiError::Initialization(s) | StorefrontApiError::RestResponseError(s) => Self::Unreachable(s),
        }
    }
}

impl From<StorefrontApiError> for AuthError {
    fn from(e: StorefrontApiError) -> Self {
        match e {
            StorefrontApiError::QueryError { status: 401, .. } => Self::InvalidCredentials,
            e => Self::LoginFailed(e.to_string()),
        }
    }
}
