use checkout_engine::{
    checkout_types::CheckoutStarted,
    test_utils::{FakeStorefront, ManualScheduler, RecordingCartStore},
    CheckoutError,
    CheckoutFlowApi,
    PollPolicy,
    Progress,
    ReconciliationPoller,
};

#[derive(Default, Debug, cucumber::World)]
pub struct CheckoutWorld {
    pub store: FakeStorefront,
    pub cart: RecordingCartStore,
    pub scheduler: ManualScheduler,
    pub started: Option<CheckoutStarted>,
    pub checkout_error: Option<CheckoutError>,
    pub progress: Option<Progress>,
}

impl CheckoutWorld {
    pub fn api(&self) -> CheckoutFlowApi<FakeStorefront, FakeStorefront> {
        CheckoutFlowApi::new(self.store.clone(), self.store.clone())
    }

    pub fn poller(&self) -> ReconciliationPoller<FakeStorefront, RecordingCartStore, ManualScheduler> {
        ReconciliationPoller::new(self.store.clone(), self.cart.clone(), self.scheduler.clone(), PollPolicy::default())
    }

    pub fn started(&self) -> &CheckoutStarted {
        self.started.as_ref().expect("Checkout has not been started")
    }

    pub fn progress(&self) -> Progress {
        self.progress.expect("The shopper has not returned from the payment page")
    }
}
