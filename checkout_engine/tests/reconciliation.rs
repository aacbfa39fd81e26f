use std::time::Duration;

use checkout_engine::{
    checkout_types::{SessionId, SessionStatus},
    test_utils::{prepare_test_env, sample_address, sample_cart, FakeStorefront, ManualScheduler, RecordingCartStore},
    traits::PaymentGatewayError,
    CheckoutFlowApi,
    Outcome,
    PollPolicy,
    Progress,
    ReconciliationHandle,
    ReconciliationPoller,
    ReconciliationState,
};
use url::Url;

type TestPoller = ReconciliationPoller<FakeStorefront, RecordingCartStore, ManualScheduler>;

struct Harness {
    store: FakeStorefront,
    cart: RecordingCartStore,
    scheduler: ManualScheduler,
    session_id: SessionId,
}

impl Harness {
    async fn new(scheduler: ManualScheduler) -> Self {
        prepare_test_env();
        let store = FakeStorefront::new();
        let cart = RecordingCartStore::new(sample_cart());
        let api = CheckoutFlowApi::new(store.clone(), store.clone());
        let host = Url::parse("http://localhost:3000").unwrap();
        let started = api.begin_checkout(&cart.cart(), &sample_address(), &host).await.unwrap();
        Self { store, cart, scheduler, session_id: started.session.session_id }
    }

    fn poller(&self) -> TestPoller {
        ReconciliationPoller::new(self.store.clone(), self.cart.clone(), self.scheduler.clone(), PollPolicy::default())
    }

    fn spawn(&self) -> ReconciliationHandle {
        ReconciliationHandle::spawn(self.poller(), Some(self.session_id.clone()))
    }

    fn script_open(&self, n: usize) {
        for _ in 0..n {
            self.store.script_status(SessionStatus::open());
        }
    }
}

#[tokio::test]
async fn inconclusive_polls_stay_pending() {
    let h = Harness::new(ManualScheduler::new()).await;
    let handle = h.spawn();
    for k in 1..5u32 {
        h.scheduler.until_parked().await;
        assert_eq!(handle.progress(), Progress { state: ReconciliationState::Pending, attempts: k });
        assert_eq!(handle.outcome(), Outcome::Processing);
        assert_eq!(h.store.status_requests(), k);
        h.scheduler.elapse();
    }
    drop(handle);
}

#[tokio::test]
async fn all_attempts_inconclusive_times_out() {
    let h = Harness::new(ManualScheduler::auto_advancing()).await;
    h.script_open(5);
    let mut handle = h.spawn();
    let progress = handle.wait_for_outcome().await;
    assert_eq!(progress, Progress { state: ReconciliationState::Timeout, attempts: 5 });
    assert_eq!(handle.outcome(), Outcome::Unconfirmed);
    assert_eq!(h.store.status_requests(), 5);
    assert_eq!(h.scheduler.requested(), vec![Duration::from_millis(2000); 4]);
    assert_eq!(h.cart.clear_count(), 0);
    assert_eq!(h.cart.cart(), sample_cart());
}

#[tokio::test]
async fn paid_session_succeeds_and_clears_cart_once() {
    let h = Harness::new(ManualScheduler::auto_advancing()).await;
    h.script_open(2);
    h.store.script_status(SessionStatus::paid());
    h.store.script_status(SessionStatus::paid());
    let mut handle = h.spawn();
    let progress = handle.wait_for_outcome().await;
    assert_eq!(progress, Progress { state: ReconciliationState::Success, attempts: 3 });
    assert_eq!(h.store.status_requests(), 3);
    assert_eq!(h.cart.clear_count(), 1);
    assert!(h.cart.cart().is_empty());
    let order = h.store.order_for_session(&h.session_id).unwrap();
    assert!(order.is_paid());
}

#[tokio::test]
async fn paid_on_final_attempt_succeeds() {
    let h = Harness::new(ManualScheduler::auto_advancing()).await;
    h.script_open(4);
    h.store.script_status(SessionStatus::paid());
    let mut handle = h.spawn();
    let progress = handle.wait_for_outcome().await;
    assert_eq!(progress, Progress { state: ReconciliationState::Success, attempts: 5 });
    assert_eq!(handle.outcome(), Outcome::Success);
    assert_eq!(h.store.status_requests(), 5);
    assert_eq!(h.scheduler.requested().len(), 4);
    assert_eq!(h.cart.clear_count(), 1);
    assert!(h.cart.cart().is_empty());
}

#[tokio::test]
async fn expired_session_halts() {
    let h = Harness::new(ManualScheduler::auto_advancing()).await;
    h.script_open(1);
    h.store.script_status(SessionStatus::expired());
    h.store.script_status(SessionStatus::paid());
    let mut handle = h.spawn();
    let progress = handle.wait_for_outcome().await;
    assert_eq!(progress.state, ReconciliationState::Expired);
    assert_eq!(h.store.status_requests(), 2);
    assert_eq!(h.cart.cart(), sample_cart());
}

#[tokio::test]
async fn query_failure_is_not_retried() {
    let h = Harness::new(ManualScheduler::auto_advancing()).await;
    h.script_open(2);
    h.store.script_failure(PaymentGatewayError::Unauthorized("token expired".into()));
    let mut handle = h.spawn();
    let progress = handle.wait_for_outcome().await;
    assert_eq!(progress, Progress { state: ReconciliationState::Error, attempts: 3 });
    assert_eq!(h.store.status_requests(), 3);
    assert_eq!(h.scheduler.requested().len(), 2);
    assert_eq!(h.cart.clear_count(), 0);
}

#[tokio::test]
async fn missing_session_id_never_starts() {
    let h = Harness::new(ManualScheduler::auto_advancing()).await;
    let mut handle = ReconciliationHandle::spawn(h.poller(), None);
    assert_eq!(handle.state(), ReconciliationState::Checking);
    assert_eq!(handle.wait_for_outcome().await, Progress::default());
    assert_eq!(h.poller().reconcile(None).await, Progress::default());
    assert_eq!(h.store.status_requests(), 0);
    assert_eq!(handle.teardown().await.state, ReconciliationState::Checking);
}

#[tokio::test]
async fn teardown_during_delay_freezes_state() {
    let h = Harness::new(ManualScheduler::new()).await;
    h.script_open(1);
    h.store.script_status(SessionStatus::paid());
    let mut handle = h.spawn();
    h.scheduler.until_parked().await;
    let progress = handle.teardown().await;
    assert_eq!(progress, Progress { state: ReconciliationState::Pending, attempts: 1 });
    h.scheduler.elapse();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(handle.progress(), progress);
    assert_eq!(h.store.status_requests(), 1);
    assert_eq!(h.cart.clear_count(), 0);
    assert_eq!(h.cart.cart(), sample_cart());
}

#[tokio::test]
async fn teardown_cancels_in_flight_query() {
    let h = Harness::new(ManualScheduler::new()).await;
    h.store.script_status(SessionStatus::paid());
    h.store.stall_status_queries();
    let mut handle = h.spawn();
    tokio::time::timeout(Duration::from_secs(5), async {
        while h.store.status_requests() == 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .unwrap();
    let progress = handle.teardown().await;
    assert_eq!(progress, Progress::default());
    assert_eq!(h.cart.clear_count(), 0);
}

#[tokio::test]
async fn dropping_the_handle_stops_polling() {
    let h = Harness::new(ManualScheduler::new()).await;
    let handle = h.spawn();
    let mut updates = handle.subscribe();
    h.scheduler.until_parked().await;
    assert_eq!(updates.borrow_and_update().state, ReconciliationState::Pending);
    drop(handle);
    tokio::time::sleep(Duration::from_millis(20)).await;
    h.scheduler.elapse();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(h.store.status_requests(), 1);
    assert!(!updates.has_changed().unwrap_or(false));
}

#[tokio::test]
async fn custom_policy_is_honoured() {
    let h = Harness::new(ManualScheduler::auto_advancing()).await;
    let policy = PollPolicy::new(2, Duration::from_millis(150));
    let poller = ReconciliationPoller::new(h.store.clone(), h.cart.clone(), h.scheduler.clone(), policy);
    let progress = poller.reconcile(Some(h.session_id.clone())).await;
    assert_eq!(progress, Progress { state: ReconciliationState::Timeout, attempts: 2 });
    assert_eq!(h.scheduler.requested(), vec![Duration::from_millis(150)]);
}
