use serde::{Deserialize, Serialize};

use crate::{
    checkout_api::reconciliation::ReconciliationState,
    checkout_types::{SessionId, SessionStatus},
};

/// Emitted exactly once per session, when the provider confirms that the session has been paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmedEvent {
    pub session_id: SessionId,
    /// Amount in cents, if the provider reported it
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
}

impl PaymentConfirmedEvent {
    pub fn new(session_id: SessionId, status: &SessionStatus) -> Self {
        Self { session_id, amount_total: status.amount_total, currency: status.currency.clone() }
    }
}

/// Emitted when reconciliation of a session reaches a terminal state, whatever that state is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationFinishedEvent {
    pub session_id: SessionId,
    pub state: ReconciliationState,
    pub attempts: u32,
}

impl ReconciliationFinishedEvent {
    pub fn new(session_id: SessionId, state: ReconciliationState, attempts: u32) -> Self {
        Self { session_id, state, attempts }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventType {
    PaymentConfirmed(PaymentConfirmedEvent),
    ReconciliationFinished(ReconciliationFinishedEvent),
}
