use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::Utc;
use gaura_common::{Secret, STORE_CURRENCY_CODE};
use log::*;
use url::Url;

use crate::{
    checkout_types::{
        AuthSession,
        NewOrder,
        Order,
        OrderId,
        OrderPaymentStatus,
        OrderStatus,
        PaymentSession,
        SessionId,
        SessionStatus,
        UserProfile,
    },
    traits::{
        AuthError,
        Authenticator,
        OrderStore,
        OrderStoreError,
        PaymentGateway,
        PaymentGatewayError,
    },
};

pub const FAKE_EMAIL: &str = "radha@example.com";
pub const FAKE_PASSWORD: &str = "hare-krishna";

/// An in-memory storefront backend: an order store, a payment provider and a login endpoint.
///
/// Session status responses are scripted with [`Self::script_status`] and [`Self::script_failure`] and handed out in
/// order, one per status query. Once the script runs out, every session reports `open`/`unpaid`. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeStorefront {
    inner: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    orders: Vec<Order>,
    sessions: HashMap<SessionId, OrderId>,
    script: VecDeque<Result<SessionStatus, PaymentGatewayError>>,
    status_requests: u32,
    order_failure: Option<OrderStoreError>,
    session_failure: Option<PaymentGatewayError>,
    stall_status_queries: bool,
}

impl FakeStorefront {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_status(&self, status: SessionStatus) -> &Self {
        self.lock().script.push_back(Ok(status));
        self
    }

    pub fn script_failure(&self, error: PaymentGatewayError) -> &Self {
        self.lock().script.push_back(Err(error));
        self
    }

    /// Makes every status query hang until it is cancelled. The query is still counted.
    pub fn stall_status_queries(&self) {
        self.lock().stall_status_queries = true;
    }

    pub fn fail_order_creation(&self, error: OrderStoreError) {
        self.lock().order_failure = Some(error);
    }

    pub fn fail_session_creation(&self, error: PaymentGatewayError) {
        self.lock().session_failure = Some(error);
    }

    pub fn status_requests(&self) -> u32 {
        self.lock().status_requests
    }

    pub fn orders_created(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn sessions_created(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn order(&self, order_id: &OrderId) -> Option<Order> {
        self.lock().orders.iter().find(|o| &o.id == order_id).cloned()
    }

    pub fn order_for_session(&self, session_id: &SessionId) -> Option<Order> {
        let order_id = self.lock().sessions.get(session_id).cloned()?;
        self.order(&order_id)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_status(&self, session_id: &SessionId) -> (bool, Result<SessionStatus, PaymentGatewayError>) {
        let mut state = self.lock();
        state.status_requests += 1;
        trace!("💳️ Status query #{} for {session_id}", state.status_requests);
        if !state.sessions.contains_key(session_id) && state.script.is_empty() {
            let message = format!("No such session: {session_id}");
            return (state.stall_status_queries, Err(PaymentGatewayError::Rejected { status: 404, message }));
        }
        let result = state.script.pop_front().unwrap_or_else(|| Ok(SessionStatus::open()));
        (state.stall_status_queries, result)
    }
}

impl OrderStore for FakeStorefront {
    async fn create_order(&self, order: NewOrder) -> Result<Order, OrderStoreError> {
        let mut state = self.lock();
        if let Some(e) = state.order_failure.clone() {
            return Err(e);
        }
        let now = Utc::now();
        let order = Order {
            id: OrderId::from(format!("{:016x}", rand::random::<u64>())),
            user_id: Some("u1".into()),
            total: order.expected_total(),
            items: order.items,
            shipping_address: order.shipping_address,
            status: OrderStatus::Pending,
            payment_status: OrderPaymentStatus::Pending,
            payment_session_id: None,
            tracking_number: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderStoreError> {
        Ok(self.lock().orders.iter().rev().cloned().collect())
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        Ok(self.order(order_id))
    }
}

impl PaymentGateway for FakeStorefront {
    async fn create_session(&self, order_id: &OrderId, host_url: &Url) -> Result<PaymentSession, PaymentGatewayError> {
        let mut guard = self.lock();
        let state = &mut *guard;
        if let Some(e) = state.session_failure.clone() {
            return Err(e);
        }
        let Some(order) = state.orders.iter_mut().find(|o| &o.id == order_id) else {
            return Err(PaymentGatewayError::Rejected { status: 404, message: "Order not found".into() });
        };
        let session_id = SessionId::from(format!("cs_test_{}", state.sessions.len() + 1));
        order.payment_session_id = Some(session_id.clone());
        state.sessions.insert(session_id.clone(), order_id.clone());
        let redirect_url = Url::parse(&format!("https://checkout.example.com/pay/{}", session_id.as_str()))
            .map_err(|e| PaymentGatewayError::InvalidResponse(e.to_string()))?;
        debug!("💳️ Fake session {session_id} returns to {host_url}order-success");
        Ok(PaymentSession { session_id, order_id: order_id.clone(), redirect_url })
    }

    async fn session_status(&self, session_id: &SessionId) -> Result<SessionStatus, PaymentGatewayError> {
        let (stall, result) = self.next_status(session_id);
        if stall {
            std::future::pending::<()>().await;
        }
        let status = result?;
        if status.is_paid() {
            let mut state = self.lock();
            let order_id = state.sessions.get(session_id).cloned();
            if let Some(order) = state.orders.iter_mut().find(|o| Some(&o.id) == order_id.as_ref()) {
                order.payment_status = OrderPaymentStatus::Paid;
                order.status = OrderStatus::Confirmed;
                if let Some(cents) = order.total.to_cents() {
                    return Ok(status.with_amount(cents, STORE_CURRENCY_CODE));
                }
            }
        }
        Ok(status)
    }
}

impl Authenticator for FakeStorefront {
    async fn login(&self, email: &str, password: &Secret<String>) -> Result<AuthSession, AuthError> {
        if email != FAKE_EMAIL || password.reveal() != FAKE_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }
        let user = UserProfile {
            id: "u1".into(),
            email: email.to_string(),
            name: "Radha".into(),
            phone: None,
            is_admin: false,
            wishlist: vec![],
        };
        Ok(AuthSession::new(Secret::from("fake-token"), user))
    }
}
