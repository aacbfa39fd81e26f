//! Route access control.
//!
//! Each storefront route requires a [`Capability`]. Access is decided once per navigation by checking the capability
//! against the current [`AuthSession`], which is passed in explicitly. Nothing is cached between navigations.
use std::{fmt::Display, str::FromStr};

use log::*;

use crate::checkout_types::{AuthSession, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Capability {
    Public,
    Customer,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Products,
    ProductDetail(ProductId),
    Login,
    Signup,
    Cart,
    Sustainability,
    About,
    Checkout,
    OrderSuccess,
    Dashboard,
    Wishlist,
    AdminHome,
    AdminProducts,
    AdminOrders,
}

impl Route {
    pub fn required_capability(&self) -> Capability {
        use Route::*;
        match self {
            Home | Products | ProductDetail(_) | Login | Signup | Cart | Sustainability | About => Capability::Public,
            Checkout | OrderSuccess | Dashboard | Wishlist => Capability::Customer,
            AdminHome | AdminProducts | AdminOrders => Capability::Admin,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Products => "/products".into(),
            Route::ProductDetail(id) => format!("/products/{}", id.as_str()),
            Route::Login => "/login".into(),
            Route::Signup => "/signup".into(),
            Route::Cart => "/cart".into(),
            Route::Sustainability => "/sustainability".into(),
            Route::About => "/about".into(),
            Route::Checkout => "/checkout".into(),
            Route::OrderSuccess => "/order-success".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::Wishlist => "/wishlist".into(),
            Route::AdminHome => "/admin".into(),
            Route::AdminProducts => "/admin/products".into(),
            Route::AdminOrders => "/admin/orders".into(),
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    /// Parses a path, ignoring any query string or trailing slash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let route = match path {
            "" => Route::Home,
            "/products" => Route::Products,
            "/login" => Route::Login,
            "/signup" => Route::Signup,
            "/cart" => Route::Cart,
            "/sustainability" => Route::Sustainability,
            "/about" => Route::About,
            "/checkout" => Route::Checkout,
            "/order-success" => Route::OrderSuccess,
            "/dashboard" => Route::Dashboard,
            "/wishlist" => Route::Wishlist,
            "/admin" => Route::AdminHome,
            "/admin/products" => Route::AdminProducts,
            "/admin/orders" => Route::AdminOrders,
            p => match p.strip_prefix("/products/") {
                Some(id) if !id.is_empty() && !id.contains('/') => Route::ProductDetail(ProductId::from(id)),
                _ => return Err(format!("Unknown route: {s}")),
            },
        };
        Ok(route)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// The route needs a signed-in shopper. Send them to the login page.
    LoginRequired,
    /// The shopper is signed in but may not see this route. Send them home.
    Denied,
}

impl Access {
    /// Where the shopper should be sent instead, if anywhere.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            Access::Granted => None,
            Access::LoginRequired => Some(Route::Login),
            Access::Denied => Some(Route::Home),
        }
    }
}

pub fn authorize(route: &Route, session: Option<&AuthSession>) -> Access {
    let access = match (route.required_capability(), session) {
        (Capability::Public, _) => Access::Granted,
        (_, None) => Access::LoginRequired,
        (Capability::Customer, Some(_)) => Access::Granted,
        (Capability::Admin, Some(s)) if s.is_admin() => Access::Granted,
        (Capability::Admin, Some(_)) => Access::Denied,
    };
    if access != Access::Granted {
        debug!("🔐️ Access to {route} is {access:?}");
    }
    access
}
