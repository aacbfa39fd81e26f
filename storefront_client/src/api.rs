use std::sync::Arc;

use checkout_engine::{
    checkout_types::{AuthSession, NewOrder, Order, OrderId, PaymentSession, SessionId, SessionStatus, UserProfile},
    traits::{AuthError, Authenticator, OrderStore, OrderStoreError, PaymentGateway, PaymentGatewayError},
};
use gaura_common::Secret;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::{
    config::StorefrontConfig,
    data_objects::{CheckoutSessionRequest, CheckoutSessionResponse, ErrorBody, LoginRequest, LoginResponse},
    StorefrontApiError,
};

#[derive(Clone)]
pub struct StorefrontApi {
    config: StorefrontConfig,
    client: Arc<Client>,
}

impl StorefrontApi {
    pub fn new(config: StorefrontConfig) -> Result<Self, StorefrontApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &config.access_token {
            let mut val = HeaderValue::from_str(&format!("Bearer {}", token.reveal()))
                .map_err(|e| StorefrontApiError::Initialization(e.to_string()))?;
            val.set_sensitive(true);
            headers.insert(AUTHORIZATION, val);
        }
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| StorefrontApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// A new client that sends `token` with every request.
    pub fn authenticated(&self, token: Secret<String>) -> Result<Self, StorefrontApiError> {
        Self::new(self.config.clone().with_access_token(token))
    }

    pub fn is_authenticated(&self) -> bool {
        self.config.access_token.is_some()
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api{path}", self.config.api_url.trim_end_matches('/'))
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, StorefrontApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| StorefrontApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StorefrontApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.map_err(|e| StorefrontApiError::RestResponseError(e.to_string()))?;
            let message = serde_json::from_str::<ErrorBody>(&text).map(|b| b.message()).unwrap_or(text);
            debug!("REST query failed. {status}: {message}");
            Err(StorefrontApiError::QueryError { status, message })
        }
    }

    pub async fn login(&self, email: &str, password: &Secret<String>) -> Result<LoginResponse, StorefrontApiError> {
        let body = LoginRequest { email, password: password.reveal() };
        let response = self.rest_query::<LoginResponse, _>(Method::POST, "/auth/login", Some(body)).await?;
        info!("🔐️ Logged in as {}", response.user.email);
        Ok(response)
    }

    /// The profile belonging to the configured access token.
    pub async fn current_user(&self) -> Result<UserProfile, StorefrontApiError> {
        self.rest_query::<UserProfile, ()>(Method::GET, "/auth/me", None).await
    }

    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, StorefrontApiError> {
        debug!("📦️ Submitting order for {} lines", order.items.len());
        let order = self.rest_query::<Order, _>(Method::POST, "/orders", Some(order)).await?;
        info!("📦️ Created order {}", order.id);
        Ok(order)
    }

    pub async fn my_orders(&self) -> Result<Vec<Order>, StorefrontApiError> {
        self.rest_query::<Vec<Order>, ()>(Method::GET, "/orders", None).await
    }

    /// Fetches a single order, or `None` if the backend does not know it.
    pub async fn order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, StorefrontApiError> {
        let path = format!("/orders/{}", urlencoding::encode(order_id.as_str()));
        match self.rest_query::<Order, ()>(Method::GET, &path, None).await {
            Ok(order) => Ok(Some(order)),
            Err(StorefrontApiError::QueryError { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create_checkout_session(
        &self,
        order_id: &OrderId,
        host_url: &Url,
    ) -> Result<CheckoutSessionResponse, StorefrontApiError> {
        let body = CheckoutSessionRequest {
            order_id: order_id.clone(),
            host_url: host_url.as_str().trim_end_matches('/').to_string(),
        };
        let response =
            self.rest_query::<CheckoutSessionResponse, _>(Method::POST, "/checkout/create-session", Some(body)).await?;
        debug!("💳️ Session {} created for order {order_id}", response.session_id);
        Ok(response)
    }

    pub async fn checkout_status(&self, session_id: &SessionId) -> Result<SessionStatus, StorefrontApiError> {
        let path = format!("/checkout/status/{}", urlencoding::encode(session_id.as_str()));
        let status = self.rest_query::<SessionStatus, ()>(Method::GET, &path, None).await?;
        trace!("💳️ Session {session_id} is {:?}/{:?}", status.status, status.payment_status);
        Ok(status)
    }
}

impl OrderStore for StorefrontApi {
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        Ok(StorefrontApi::create_order(self, &order).await?)
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderStoreError> {
        Ok(self.my_orders().await?)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        Ok(self.order_by_id(order_id).await?)
    }
}

impl PaymentGateway for StorefrontApi {
    async fn create_session(&self, order_id: &OrderId, host_url: &Url) -> Result<PaymentSession, PaymentGatewayError> {
        let response = self.create_checkout_session(order_id, host_url).await?;
        Ok(response.into_session(order_id.clone()))
    }

    async fn session_status(&self, session_id: &SessionId) -> Result<SessionStatus, PaymentGatewayError> {
        Ok(self.checkout_status(session_id).await?)
    }
}

impl Authenticator for StorefrontApi {
    async fn login(&self, email: &str, password: &Secret<String>) -> Result<AuthSession, AuthError> {
        let response = StorefrontApi::login(self, email, password).await?;
        Ok(AuthSession::new(Secret::new(response.token), response.user))
    }
}
