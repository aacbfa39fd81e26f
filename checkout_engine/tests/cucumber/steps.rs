use checkout_engine::{
    checkout_types::{CartLineItem, SessionStatus},
    helpers::session_id_from_return_url,
    test_utils::{sample_address, ManualScheduler},
    traits::{CartStore, OrderStoreError, PaymentGatewayError},
    CheckoutError,
    ReconciliationHandle,
    ReconciliationState,
};
use cucumber::{given, then, when};
use gaura_common::Money;
use serde_json::json;
use url::Url;

use crate::cucumber::CheckoutWorld;

const HOST_URL: &str = "http://localhost:3000";

#[given(expr = "a cart with {int} x {string} at {word}")]
async fn cart_with(world: &mut CheckoutWorld, qty: u32, name: String, price: String) {
    world.scheduler = ManualScheduler::auto_advancing();
    let price = price.parse::<Money>().expect("Not a valid price");
    let mut cart = world.cart.load().expect("Could not load cart");
    cart.add_item(CartLineItem::new("p1", name, qty, price)).expect("Could not add to cart");
    world.cart.save(&cart).expect("Could not save cart");
}

#[given("the order store rejects new orders")]
async fn order_store_rejects(world: &mut CheckoutWorld) {
    world.store.fail_order_creation(OrderStoreError::Rejected { status: 422, message: "Invalid order".into() });
}

#[given(expr = "the provider reports the session as {word} and {word}")]
async fn provider_reports(world: &mut CheckoutWorld, status: String, payment_status: String) {
    script(world, &status, &payment_status, 1);
}

#[given(expr = "the provider reports the session as {word} and {word} {int} times")]
async fn provider_reports_repeatedly(world: &mut CheckoutWorld, status: String, payment_status: String, n: usize) {
    script(world, &status, &payment_status, n);
}

fn script(world: &mut CheckoutWorld, status: &str, payment_status: &str, n: usize) {
    let status: SessionStatus = serde_json::from_value(json!({"status": status, "payment_status": payment_status}))
        .expect("Not a valid session status");
    for _ in 0..n {
        world.store.script_status(status.clone());
    }
}

#[given("the provider cannot be reached")]
async fn provider_unreachable(world: &mut CheckoutWorld) {
    world.store.script_failure(PaymentGatewayError::Unreachable("connection refused".into()));
}

#[when("I check out")]
async fn check_out(world: &mut CheckoutWorld) {
    let cart = world.cart.load().expect("Could not load cart");
    let host = Url::parse(HOST_URL).expect("Invalid host url");
    match world.api().begin_checkout(&cart, &sample_address(), &host).await {
        Ok(started) => world.started = Some(started),
        Err(e) => world.checkout_error = Some(e),
    }
}

#[when("I return from the payment page")]
async fn return_from_payment(world: &mut CheckoutWorld) {
    let url = format!("{HOST_URL}/order-success?session_id={}", world.started().session.session_id.as_str());
    reconcile(world, &url).await;
}

#[when("I return from the payment page without a session id")]
async fn return_without_session(world: &mut CheckoutWorld) {
    reconcile(world, &format!("{HOST_URL}/order-success")).await;
}

async fn reconcile(world: &mut CheckoutWorld, return_url: &str) {
    let session_id = session_id_from_return_url(return_url);
    let mut handle = ReconciliationHandle::spawn(world.poller(), session_id);
    world.progress = Some(handle.wait_for_outcome().await);
}

#[then(expr = "the order total is {word}")]
async fn order_total(world: &mut CheckoutWorld, total: String) {
    let expected = total.parse::<Money>().expect("Not a valid price");
    let order = world.store.order(&world.started().order_id).expect("Order was not created");
    assert_eq!(order.total, expected);
}

#[then("a payment session is opened")]
async fn session_opened(world: &mut CheckoutWorld) {
    let started = world.started();
    assert_eq!(started.session.order_id, started.order_id);
    assert_eq!(world.store.sessions_created(), 1);
}

#[then("no payment session is opened")]
async fn no_session(world: &mut CheckoutWorld) {
    assert!(world.started.is_none());
    assert_eq!(world.store.sessions_created(), 0);
}

#[then("checkout fails because the order could not be created")]
async fn order_creation_failed(world: &mut CheckoutWorld) {
    assert!(matches!(world.checkout_error, Some(CheckoutError::OrderCreation(_))));
}

#[then(expr = "reconciliation ends in {word} after {int} attempts")]
async fn ends_in(world: &mut CheckoutWorld, state: String, attempts: u32) {
    let expected = state.parse::<ReconciliationState>().expect("Not a valid state");
    let progress = world.progress();
    assert!(expected.is_terminal());
    assert_eq!(progress.state, expected);
    assert_eq!(progress.attempts, attempts);
}

#[then(expr = "reconciliation stays in {word}")]
async fn stays_in(world: &mut CheckoutWorld, state: String) {
    let expected = state.parse::<ReconciliationState>().expect("Not a valid state");
    assert_eq!(world.progress().state, expected);
}

#[then(expr = "{int} status queries were made")]
async fn status_queries(world: &mut CheckoutWorld, n: u32) {
    assert_eq!(world.store.status_requests(), n);
}

#[then("the cart is empty")]
async fn cart_empty(world: &mut CheckoutWorld) {
    assert!(world.cart.cart().is_empty());
    assert_eq!(world.cart.clear_count(), 1);
}

#[then(expr = "the cart holds {int} items")]
async fn cart_holds(world: &mut CheckoutWorld, n: u32) {
    assert_eq!(world.cart.cart().item_count(), n);
    assert_eq!(world.cart.clear_count(), 0);
}

#[then("the order is marked as paid")]
async fn order_paid(world: &mut CheckoutWorld) {
    let order = world.store.order(&world.started().order_id).expect("Order was not created");
    assert!(order.is_paid());
}

#[then(expr = "the shopper is told {string}")]
async fn shopper_told(world: &mut CheckoutWorld, message: String) {
    assert_eq!(world.progress().state.outcome().to_string(), message);
}
