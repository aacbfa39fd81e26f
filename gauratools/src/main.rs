use checkout_engine::checkout_types::{OrderId, ProductId};
use clap::{Args, Parser, Subcommand};
use gaura_common::Money;
use log::*;

mod cart_file;
mod commands;
mod formatting;
mod profile_manager;

use commands::{
    handle_access,
    handle_cart,
    handle_checkout,
    handle_login,
    handle_orders,
    handle_profile,
    handle_reconcile,
    parse_product_id,
    Context,
};
use profile_manager::load_profile;

#[derive(Parser, Debug)]
#[command(version, about = "Gaura Naturals storefront tools: manage your cart, check out and confirm payments")]
pub struct Arguments {
    /// The profile in ~/.gauratools/config.toml to use
    #[arg(short, long, default_value = "default")]
    profile: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(subcommand, about = "View or change your cart")]
    Cart(CartCommand),
    #[clap(name = "checkout", about = "Place an order for your cart and open a payment session")]
    Checkout(CheckoutParams),
    #[clap(name = "reconcile", about = "Confirm the payment for a session after returning from the payment page")]
    Reconcile(ReconcileParams),
    #[clap(name = "orders", about = "Show your order history, or one order in detail")]
    Orders {
        order_id: Option<OrderId>,
    },
    #[clap(name = "login", about = "Log in and print an access token")]
    Login {
        email: Option<String>,
    },
    #[clap(name = "access", about = "Check whether you may visit a storefront route, e.g. /checkout")]
    Access {
        path: String,
    },
    #[command(subcommand, about = "Manage connection profiles")]
    Profile(ProfileCommand),
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    Show,
    Add {
        #[arg(value_parser = parse_product_id)]
        product_id: ProductId,
        /// The product name, as shown on the storefront
        name: String,
        /// Unit price, e.g. 12.50
        price: Money,
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },
    /// Set the quantity of a product. Setting it to zero removes the product.
    #[clap(name = "set-qty")]
    SetQuantity {
        #[arg(value_parser = parse_product_id)]
        product_id: ProductId,
        quantity: u32,
    },
    Remove {
        #[arg(value_parser = parse_product_id)]
        product_id: ProductId,
    },
    Clear,
}

#[derive(Debug, Args)]
pub struct CheckoutParams {
    /// Street address. You will be prompted for any address field you leave out.
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    zip: Option<String>,
    #[arg(long)]
    country: Option<String>,
    /// Wait here while you pay, then confirm the payment straight away
    #[arg(short, long)]
    wait: bool,
}

#[derive(Debug, Args)]
pub struct ReconcileParams {
    /// The URL the payment page sent you back to, or just the session id
    target: String,
    /// How many times to ask the payment provider before giving up
    #[arg(short = 'n', long)]
    max_attempts: Option<u32>,
    /// Milliseconds to wait between attempts
    #[arg(short, long)]
    interval_ms: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    List,
    Add {
        name: String,
        api_url: String,
        host_url: String,
        /// Environment variable that holds the access token for this profile
        #[arg(short, long)]
        token_envar: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    env_logger::init();
    let cli = Arguments::parse();
    if let Err(e) = run(cli).await {
        error!("🖥️ {e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Arguments) -> anyhow::Result<()> {
    let context = || -> anyhow::Result<Context> {
        let profile = load_profile(&cli.profile)?;
        debug!("🖥️ Using profile {} ({})", profile.name, profile.api_url);
        Context::new(profile)
    };
    match cli.command {
        Command::Profile(command) => handle_profile(command),
        Command::Cart(command) => handle_cart(&context()?, command),
        Command::Checkout(params) => handle_checkout(&context()?, params).await,
        Command::Reconcile(params) => handle_reconcile(&context()?, params).await,
        Command::Orders { order_id } => handle_orders(&context()?, order_id).await,
        Command::Login { email } => handle_login(&context()?, email).await,
        Command::Access { path } => handle_access(&context()?, &path).await,
    }
}
