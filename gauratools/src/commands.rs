use std::{path::PathBuf, time::Duration};

use anyhow::{anyhow, bail, Result};
use checkout_engine::{
    access::{authorize, Access, Route},
    checkout_types::{AuthSession, CartLineItem, OrderId, ProductId, ShippingAddress},
    events::{EventHandlers, EventHooks, PaymentConfirmedEvent},
    helpers::session_id_or_return_url,
    traits::{Authenticator, CartStore, TokioScheduler},
    CheckoutFlowApi,
    Outcome,
    PollPolicy,
    Progress,
    ReconciliationHandle,
    ReconciliationPoller,
};
use dialoguer::{Confirm, Input, Password};
use gaura_common::{helpers::parse_boolean_flag, Money, Secret};
use indicatif::{ProgressBar, ProgressStyle};
use log::*;
use prettytable::{row, Table};
use storefront_client::StorefrontApi;

use crate::{
    cart_file::JsonFileCartStore,
    formatting::{format_cart, format_checkout_started, format_order, format_orders, format_progress},
    profile_manager::{get_config_dir, read_config, write_config, Profile},
    CartCommand,
    CheckoutParams,
    ProfileCommand,
    ReconcileParams,
};

/// Everything a command needs to talk to one storefront.
pub struct Context {
    profile: Profile,
    config_dir: PathBuf,
}

impl Context {
    pub fn new(profile: Profile) -> Result<Self> {
        let config_dir = get_config_dir()?;
        Ok(Self { profile, config_dir })
    }

    fn api(&self) -> Result<StorefrontApi> {
        Ok(StorefrontApi::new(self.profile.storefront_config())?)
    }

    fn cart_store(&self) -> JsonFileCartStore {
        JsonFileCartStore::new(self.profile.cart_path(&self.config_dir))
    }

    /// The signed-in shopper, if the profile's access token is set and still valid.
    async fn auth_session(&self, api: &StorefrontApi) -> Option<AuthSession> {
        let token = self.profile.access_token()?;
        match api.current_user().await {
            Ok(user) => Some(AuthSession::new(token, user)),
            Err(e) if e.is_unauthorized() => {
                warn!("🔐️ The token in {} was rejected. {e}", self.profile.token_envar());
                None
            },
            Err(e) => {
                warn!("🔐️ Could not fetch the current user. {e}");
                None
            },
        }
    }

    async fn require(&self, route: Route, api: &StorefrontApi) -> Result<()> {
        let session = self.auth_session(api).await;
        match authorize(&route, session.as_ref()) {
            Access::Granted => Ok(()),
            Access::LoginRequired => {
                let envar = self.profile.token_envar();
                bail!("You need to be logged in for this. Run `gauratools login` and set {envar}")
            },
            Access::Denied => bail!("Your account is not allowed to access {route}"),
        }
    }
}

//--------------------------------------         Cart          ---------------------------------------------------------
pub fn handle_cart(ctx: &Context, command: CartCommand) -> Result<()> {
    let store = ctx.cart_store();
    let mut cart = store.load()?;
    match command {
        CartCommand::Show => {},
        CartCommand::Add { product_id, name, quantity, price } => {
            cart.add_item(CartLineItem::new(product_id, name, quantity, price))?;
            store.save(&cart)?;
        },
        CartCommand::SetQuantity { product_id, quantity } => {
            cart.update_quantity(&product_id, quantity)?;
            store.save(&cart)?;
        },
        CartCommand::Remove { product_id } => {
            let removed = cart.remove_item(&product_id)?;
            println!("Removed {}", removed.product_name);
            store.save(&cart)?;
        },
        CartCommand::Clear => {
            store.clear()?;
            cart.clear();
        },
    }
    println!("{}", format_cart(&cart));
    Ok(())
}

//--------------------------------------       Checkout        ---------------------------------------------------------
pub async fn handle_checkout(ctx: &Context, params: CheckoutParams) -> Result<()> {
    let api = ctx.api()?;
    ctx.require(Route::Checkout, &api).await?;
    let cart = ctx.cart_store().load()?;
    if cart.is_empty() {
        bail!("Your cart is empty. Add something with `gauratools cart add` first.");
    }
    println!("{}", format_cart(&cart));
    let address = shipping_address(&params)?;
    address.validate().map_err(|missing| anyhow!("Shipping address is incomplete. Missing: {}", missing.join(", ")))?;
    let host_url = api.config().host_url()?;
    let flow = CheckoutFlowApi::new(api.clone(), api.clone());
    let started = flow.begin_checkout(&cart, &address, &host_url).await?;
    let show_qr = parse_boolean_flag(std::env::var("GAURA_SHOW_QR").ok(), true);
    println!("{}", format_checkout_started(&started, show_qr)?);
    let session_id = started.session.session_id.to_string();
    if params.wait && Confirm::new().with_prompt("Have you completed the payment?").default(true).interact()? {
        let params = ReconcileParams { target: session_id, max_attempts: None, interval_ms: None };
        handle_reconcile(ctx, params).await?;
    } else {
        println!("Once you have paid, run `gauratools reconcile {session_id}` (or pass the return URL).");
    }
    Ok(())
}

fn shipping_address(params: &CheckoutParams) -> Result<ShippingAddress> {
    let field = |value: &Option<String>, prompt: &str| -> Result<String> {
        match value {
            Some(v) => Ok(v.clone()),
            None => Ok(Input::<String>::new().with_prompt(prompt).allow_empty(true).interact_text()?),
        }
    };
    Ok(ShippingAddress {
        address: field(&params.address, "Street address")?,
        city: field(&params.city, "City")?,
        state: field(&params.state, "State")?,
        zip: field(&params.zip, "ZIP / postal code")?,
        country: field(&params.country, "Country")?,
    })
}

//--------------------------------------       Reconcile       ---------------------------------------------------------
pub async fn handle_reconcile(ctx: &Context, params: ReconcileParams) -> Result<()> {
    let Some(session_id) = session_id_or_return_url(&params.target) else {
        println!("There is no payment session in '{}'. Nothing to confirm.", params.target);
        return Ok(());
    };
    let defaults = ctx.profile.poll_policy();
    let policy = PollPolicy::new(
        params.max_attempts.unwrap_or(defaults.max_attempts),
        params.interval_ms.map(Duration::from_millis).unwrap_or(defaults.interval),
    );
    let mut hooks = EventHooks::default();
    hooks.on_payment_confirmed(|ev| Box::pin(notify_payment(ev)));
    let handlers = EventHandlers::new(4, hooks);
    let producers = handlers.producers();
    let mut notifications = handlers.start_handlers();

    let poller =
        ReconciliationPoller::new(ctx.api()?, ctx.cart_store(), TokioScheduler, policy).with_producers(producers);
    let mut handle = ReconciliationHandle::spawn(poller, Some(session_id.clone()));
    let pb = spinner(format!("Confirming payment for session {session_id}"));
    let progress = watch_progress(&mut handle, &pb).await;
    pb.finish_with_message(format_progress(&progress));
    // The poller is gone by now, so this only waits for notifications already in flight
    while let Some(done) = notifications.join_next().await {
        if let Err(e) = done {
            warn!("🔔️ Notification task failed. {e}");
        }
    }

    let outcome = progress.state.outcome();
    println!("{outcome}");
    if outcome == Outcome::Unconfirmed {
        println!("Run `gauratools orders` to see your order history.");
    }
    Ok(())
}

async fn watch_progress(handle: &mut ReconciliationHandle, pb: &ProgressBar) -> Progress {
    let mut updates = handle.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let progress = *updates.borrow_and_update();
                pb.set_message(format_progress(&progress));
                if progress.state.is_terminal() {
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                pb.set_message("Stopping...");
                let progress = handle.teardown().await;
                info!("🔁️ Reconciliation cancelled at {}", format_progress(&progress));
                return progress;
            },
        }
    }
    handle.wait_for_outcome().await
}

async fn notify_payment(event: PaymentConfirmedEvent) {
    let amount = event.amount_total.map(Money::from_cents).map(|m| m.to_string());
    let currency = event.currency.map(|c| c.to_uppercase()).unwrap_or_default();
    match amount {
        Some(amount) => println!("\n🔔 Payment of {amount} {currency} received for session {}", event.session_id),
        None => println!("\n🔔 Payment received for session {}", event.session_id),
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(100));
    let ticks = ["🕛 ", "🕐 ", "🕑 ", "🕒 ", "🕓 ", "🕔 ", "🕕 ", "🕖 ", "🕗 ", "🕘 ", "🕙 ", "🕚 "];
    let style = ProgressStyle::with_template("{spinner:5} {msg} [{elapsed}]")
        .map(|s| s.tick_strings(&ticks))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message);
    pb
}

//--------------------------------------        Orders         ---------------------------------------------------------
pub async fn handle_orders(ctx: &Context, order_id: Option<OrderId>) -> Result<()> {
    let api = ctx.api()?;
    ctx.require(Route::Dashboard, &api).await?;
    let flow = CheckoutFlowApi::new(api.clone(), api);
    match order_id {
        Some(id) => match flow.order(&id).await? {
            Some(order) => println!("{}", format_order(&order)?),
            None => println!("Order {id} does not exist"),
        },
        None => println!("{}", format_orders(&flow.order_history().await?)),
    }
    Ok(())
}

//--------------------------------------   Login and access    ---------------------------------------------------------
pub async fn handle_login(ctx: &Context, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = Secret::new(Password::new().with_prompt("Password").interact()?);
    let api = ctx.api()?;
    let session = Authenticator::login(&api, &email, &password).await?;
    println!("Welcome back, {}!", session.user.name);
    println!("To use this session, run:\n  export {}={}", ctx.profile.token_envar(), session.token.reveal());
    Ok(())
}

pub async fn handle_access(ctx: &Context, path: &str) -> Result<()> {
    let route = path.parse::<Route>().map_err(|e| anyhow!(e))?;
    let api = ctx.api()?;
    let session = ctx.auth_session(&api).await;
    let access = authorize(&route, session.as_ref());
    match access.redirect() {
        None => println!("{route}: access granted"),
        Some(target) => println!("{route}: {access:?}. You would be sent to {target}"),
    }
    Ok(())
}

//--------------------------------------       Profiles        ---------------------------------------------------------
pub fn handle_profile(command: ProfileCommand) -> Result<()> {
    let mut config = read_config()?;
    match command {
        ProfileCommand::List => {
            let mut table = Table::new();
            table.set_titles(row!["Name", "API", "Storefront", "Token variable"]);
            for p in &config.profiles {
                table.add_row(row![p.name, p.api_url, p.host_url, p.token_envar()]);
            }
            println!("{table}");
        },
        ProfileCommand::Add { name, api_url, host_url, token_envar } => {
            let profile = Profile { name, api_url, host_url, token_envar, ..Profile::default() };
            println!("Saved profile {}", profile.name);
            config.upsert(profile);
            write_config(&config)?;
        },
    }
    Ok(())
}

pub fn parse_product_id(s: &str) -> Result<ProductId, String> {
    let s = s.trim();
    if s.is_empty() {
        Err("Product id cannot be empty".to_string())
    } else {
        Ok(ProductId::from(s))
    }
}
