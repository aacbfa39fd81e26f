//! Drives a [`Reconciliation`] against a real payment gateway.
//!
//! [`ReconciliationPoller`] performs the status queries, waits between them using the injected [`Scheduler`], and
//! carries out the side effects of a confirmed payment: the cart is cleared and a [`PaymentConfirmedEvent`] is
//! published. Both happen at most once, since `SUCCESS` is terminal.
//!
//! [`ReconciliationHandle`] runs a poller on the tokio runtime and owns its lifecycle. Tearing the handle down (or
//! dropping it) before reconciliation finishes cancels both a pending delay and an in-flight query. Nothing observable
//! changes after teardown: no state updates, no cart clearing, no notifications.
use std::{fmt::Debug, future::Future};

use log::*;
use tokio::{
    sync::{oneshot, watch},
    task::JoinHandle,
};

use crate::{
    checkout_api::reconciliation::{Outcome, PollPolicy, Progress, Reconciliation, ReconciliationState, Step},
    checkout_types::{SessionId, SessionStatus},
    events::{EventProducers, PaymentConfirmedEvent, ReconciliationFinishedEvent},
    traits::{CartStore, PaymentGateway, Scheduler},
};

pub struct ReconciliationPoller<G, C, S> {
    gateway: G,
    cart: C,
    scheduler: S,
    policy: PollPolicy,
    producers: EventProducers,
}

impl<G, C, S> Debug for ReconciliationPoller<G, C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationPoller({:?})", self.policy)
    }
}

impl<G, C, S> ReconciliationPoller<G, C, S> {
    pub fn new(gateway: G, cart: C, scheduler: S, policy: PollPolicy) -> Self {
        Self { gateway, cart, scheduler, policy, producers: EventProducers::default() }
    }

    pub fn with_producers(mut self, producers: EventProducers) -> Self {
        self.producers = producers;
        self
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }
}

impl<G, C, S> ReconciliationPoller<G, C, S>
where
    G: PaymentGateway,
    C: CartStore,
    S: Scheduler,
{
    /// Reconciles `session_id` to completion and returns the final progress.
    pub async fn reconcile(&self, session_id: Option<SessionId>) -> Progress {
        let (progress, _) = watch::channel(Progress::default());
        self.run(session_id, &progress, std::future::pending::<()>()).await
    }

    /// Runs reconciliation, publishing every change of progress to `progress`, until a terminal state is reached or
    /// `shutdown` resolves.
    ///
    /// Without a session id there is nothing to reconcile: no query is made and the state stays `CHECKING`.
    pub async fn run<F>(
        &self,
        session_id: Option<SessionId>,
        progress: &watch::Sender<Progress>,
        mut shutdown: F,
    ) -> Progress
    where
        F: Future + Unpin,
    {
        let Some(session_id) = session_id else {
            info!("🔁️ No payment session to reconcile");
            return Progress::default();
        };
        let mut machine = Reconciliation::new(self.policy);
        let mut step = machine.begin();
        debug!("🔁️ Reconciling payment session {session_id} with {:?}", self.policy);
        loop {
            match step {
                Step::Poll => {
                    let result = tokio::select! {
                        biased;
                        _ = &mut shutdown => return self.torn_down(&session_id, &machine),
                        r = self.gateway.session_status(&session_id) => r,
                    };
                    step = match result {
                        Ok(status) => {
                            let step = machine.on_status(&status);
                            if machine.state() == ReconciliationState::Success {
                                self.confirm_payment(&session_id, &status).await;
                            }
                            step
                        },
                        Err(e) => {
                            warn!("🔁️ Status query for session {session_id} failed. {e}");
                            machine.on_query_failed()
                        },
                    };
                    progress.send_replace(machine.progress());
                },
                Step::Wait(interval) => {
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => return self.torn_down(&session_id, &machine),
                        _ = self.scheduler.delay(interval) => {},
                    }
                    step = Step::Poll;
                },
                Step::Finished(state) => {
                    let attempts = machine.attempts();
                    info!("🔁️ Reconciliation of session {session_id} ended in {state} after {attempts} attempts");
                    let event = ReconciliationFinishedEvent::new(session_id.clone(), state, attempts);
                    self.producers.publish_reconciliation_finished(event).await;
                    return machine.progress();
                },
            }
        }
    }

    async fn confirm_payment(&self, session_id: &SessionId, status: &SessionStatus) {
        match self.cart.clear() {
            Ok(()) => debug!("🛒️ Cart cleared after payment for session {session_id}"),
            Err(e) => error!("🛒️ Payment for session {session_id} was confirmed, but the cart could not be cleared. {e}"),
        }
        match status.amount() {
            Some(amount) => info!("💳️ Payment of {amount} confirmed for session {session_id}"),
            None => info!("💳️ Payment confirmed for session {session_id}"),
        }
        let event = PaymentConfirmedEvent::new(session_id.clone(), status);
        self.producers.publish_payment_confirmed(event).await;
    }

    fn torn_down(&self, session_id: &SessionId, machine: &Reconciliation) -> Progress {
        info!("🔁️ Reconciliation of session {session_id} torn down in state {}", machine.state());
        machine.progress()
    }
}

//--------------------------------------  ReconciliationHandle  --------------------------------------------------------
/// A reconciliation running in the background.
///
/// The current state can be read at any time with [`Self::state`]. Dropping the handle has the same effect as
/// [`Self::teardown`], except that it does not wait for the task to stop.
pub struct ReconciliationHandle {
    progress: watch::Receiver<Progress>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Progress>>,
}

impl Debug for ReconciliationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationHandle({:?}, running: {})", self.progress(), self.task.is_some())
    }
}

impl ReconciliationHandle {
    /// Starts reconciling `session_id` on the current tokio runtime. If there is no session id, nothing is spawned and
    /// the handle reports `CHECKING` forever.
    pub fn spawn<G, C, S>(poller: ReconciliationPoller<G, C, S>, session_id: Option<SessionId>) -> Self
    where
        G: PaymentGateway + Send + Sync + 'static,
        C: CartStore + Send + Sync + 'static,
        S: Scheduler + Send + Sync + 'static,
    {
        let (tx, progress) = watch::channel(Progress::default());
        if session_id.is_none() {
            info!("🔁️ No payment session to reconcile");
            return Self { progress, shutdown: None, task: None };
        }
        let (shutdown, stop) = oneshot::channel::<()>();
        let task = tokio::spawn(async move { poller.run(session_id, &tx, stop).await });
        Self { progress, shutdown: Some(shutdown), task: Some(task) }
    }

    pub fn progress(&self) -> Progress {
        *self.progress.borrow()
    }

    pub fn state(&self) -> ReconciliationState {
        self.progress().state
    }

    pub fn outcome(&self) -> Outcome {
        self.state().outcome()
    }

    /// A receiver that is notified every time the reconciliation makes progress.
    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.clone()
    }

    /// Waits for the reconciliation to finish. Returns immediately if nothing is running.
    pub async fn wait_for_outcome(&mut self) -> Progress {
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("🔁️ Reconciliation task did not complete. {e}");
            }
            self.shutdown = None;
        }
        self.progress()
    }

    /// Stops the reconciliation if it is still running. Once this returns, the state will not change again.
    pub async fn teardown(&mut self) -> Progress {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("🔁️ Reconciliation task did not shut down cleanly. {e}");
            }
        }
        self.progress()
    }
}

impl Drop for ReconciliationHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
