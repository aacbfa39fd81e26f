use std::{convert::Infallible, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use gaura_common::{Money, Secret};
use serde::{Deserialize, Serialize};
use url::Url;

macro_rules! string_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl FromStr for $name {
            type Err = Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.to_string()))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

//--------------------------------------      Identifiers      ---------------------------------------------------------
string_id!(ProductId, "");
string_id!(OrderId, "#");
string_id!(SessionId, "");

//--------------------------------------     CartLineItem      ---------------------------------------------------------
/// A single product line in the shopper's cart, and later in an order.
///
/// On the wire the unit price is called `price`, which is what the order store expects when an order is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    #[serde(rename = "price")]
    pub unit_price: Money,
}

impl CartLineItem {
    pub fn new<P, S>(product_id: P, product_name: S, quantity: u32, unit_price: Money) -> Self
    where
        P: Into<ProductId>,
        S: Into<String>,
    {
        Self { product_id: product_id.into(), product_name: product_name.into(), quantity, unit_price }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }
}

//--------------------------------------    ShippingAddress    ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl ShippingAddress {
    /// Returns the names of any required fields that are blank. An empty result means the address is complete.
    ///
    /// The order intent builder does not call this; it is up to the caller to check before placing an order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn validate(&self) -> Result<(), Vec<&'static str>> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(missing)
        }
    }
}

impl Display for ShippingAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}, {} {}, {}", self.address, self.city, self.state, self.zip, self.country)
    }
}

//--------------------------------------       NewOrder        ---------------------------------------------------------
/// The request to create an order: the cart lines at the time of checkout plus where to ship them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub items: Vec<CartLineItem>,
    pub shipping_address: ShippingAddress,
}

impl NewOrder {
    pub fn new(items: Vec<CartLineItem>, shipping_address: ShippingAddress) -> Self {
        Self { items, shipping_address }
    }

    /// The total the order store is expected to compute for this order.
    pub fn expected_total(&self) -> Money {
        self.items.iter().map(CartLineItem::line_total).sum()
    }
}

//--------------------------------------      OrderStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting payment.
    Pending,
    /// Payment has been received.
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Other,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Confirmed => write!(f, "Confirmed"),
            OrderStatus::Processing => write!(f, "Processing"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
            OrderStatus::Other => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderPaymentStatus {
    Pending,
    Paid,
    #[serde(other)]
    Other,
}

impl Display for OrderPaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderPaymentStatus::Pending => write!(f, "Unpaid"),
            OrderPaymentStatus::Paid => write!(f, "Paid"),
            OrderPaymentStatus::Other => write!(f, "Unknown"),
        }
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
/// An order as persisted by the order store. The client never changes an order after it has been created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<String>,
    pub items: Vec<CartLineItem>,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub payment_status: OrderPaymentStatus,
    pub total: Money,
    #[serde(default)]
    pub payment_session_id: Option<SessionId>,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == OrderPaymentStatus::Paid
    }
}

//--------------------------------------    PaymentSession     ---------------------------------------------------------
/// A hosted-checkout session opened with the payment provider for a single order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub session_id: SessionId,
    pub order_id: OrderId,
    /// Where the shopper must be sent to complete the payment. Control only comes back to us when the provider
    /// redirects to the return URL.
    pub redirect_url: Url,
}

/// The result of a successful checkout hand-off: the order exists and a session is waiting for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutStarted {
    pub order_id: OrderId,
    pub session: PaymentSession,
}

//--------------------------------------     SessionStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Open,
    Complete,
    Expired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPaymentState {
    Unpaid,
    Paid,
    NoPaymentRequired,
    #[serde(other)]
    Unknown,
}

/// What the payment provider currently reports for a session. Observed, never set, by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub status: SessionState,
    pub payment_status: SessionPaymentState,
    /// Amount in cents, as reported by the provider
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl SessionStatus {
    pub fn new(status: SessionState, payment_status: SessionPaymentState) -> Self {
        Self { status, payment_status, amount_total: None, currency: None }
    }

    pub fn open() -> Self {
        Self::new(SessionState::Open, SessionPaymentState::Unpaid)
    }

    pub fn paid() -> Self {
        Self::new(SessionState::Complete, SessionPaymentState::Paid)
    }

    pub fn expired() -> Self {
        Self::new(SessionState::Expired, SessionPaymentState::Unpaid)
    }

    pub fn with_amount(mut self, cents: i64, currency: &str) -> Self {
        self.amount_total = Some(cents);
        self.currency = Some(currency.to_string());
        self
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == SessionPaymentState::Paid
    }

    pub fn is_expired(&self) -> bool {
        self.status == SessionState::Expired
    }

    pub fn amount(&self) -> Option<Money> {
        self.amount_total.map(Money::from_cents)
    }
}

//--------------------------------------      UserProfile      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub wishlist: Vec<ProductId>,
}

//--------------------------------------      AuthSession      ---------------------------------------------------------
/// The authentication context for the current shopper. It lives from login until logout and is passed explicitly to
/// whatever needs it; nothing reads it from global state.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: Secret<String>,
    pub user: UserProfile,
}

impl AuthSession {
    pub fn new(token: Secret<String>, user: UserProfile) -> Self {
        Self { token, user }
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_admin
    }
}
