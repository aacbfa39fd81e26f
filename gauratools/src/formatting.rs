use std::fmt::Write;

use anyhow::Result;
use checkout_engine::{
    cart::Cart,
    checkout_types::{CheckoutStarted, Order},
    Progress,
};
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};
use qrcode::{render::unicode, QrCode};

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_table() -> Table {
    let mut table = Table::new();
    table.set_format(markdown_format());
    table
}

pub fn format_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty".to_string();
    }
    let mut table = markdown_table();
    table.set_titles(row!["Product id", "Product", "Qty", "Price", "Line total"]);
    for item in cart.items() {
        table.add_row(row![
            item.product_id,
            item.product_name,
            r->item.quantity,
            r->item.unit_price,
            r->item.line_total()
        ]);
    }
    table.add_row(row!["", "Total", r->cart.item_count(), "", r->cart.total()]);
    table.to_string()
}

pub fn format_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "You have not placed any orders yet".to_string();
    }
    let mut table = markdown_table();
    table.set_titles(row!["Order", "Placed", "Items", "Total", "Status", "Payment"]);
    for order in orders {
        let placed = order.created_at.map(|t| t.format("%Y-%m-%d %H:%M").to_string()).unwrap_or_default();
        table.add_row(row![
            order.id,
            placed,
            r->order.item_count(),
            r->order.total,
            order.status,
            order.payment_status
        ]);
    }
    table.to_string()
}

pub fn format_order(order: &Order) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "## Order {}", order.id)?;
    writeln!(f, "Status: {:<20} Payment: {}", order.status.to_string(), order.payment_status)?;
    writeln!(f, "Total: {}", order.total)?;
    if let Some(placed) = order.created_at {
        writeln!(f, "Placed: {}", placed.format("%Y-%m-%d %H:%M:%S UTC"))?;
    }
    if let Some(tracking) = &order.tracking_number {
        writeln!(f, "Tracking number: {tracking}")?;
    }
    writeln!(f, "Ship to: {}", order.shipping_address)?;
    let mut table = markdown_table();
    table.set_titles(row!["Product", "Qty", "Price", "Line total"]);
    for item in &order.items {
        table.add_row(row![item.product_name, r->item.quantity, r->item.unit_price, r->item.line_total()]);
    }
    writeln!(f, "{table}")?;
    Ok(f)
}

pub fn format_checkout_started(started: &CheckoutStarted, show_qr: bool) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "Order {} placed.", started.order_id)?;
    writeln!(f, "Payment session: {}", started.session.session_id)?;
    writeln!(f, "Complete your payment at:\n{}", started.session.redirect_url)?;
    if show_qr {
        writeln!(f, "{}", qr_code(started.session.redirect_url.as_str()))?;
    }
    Ok(f)
}

pub fn format_progress(progress: &Progress) -> String {
    format!("{} (attempt {})", progress.state, progress.attempts)
}

fn qr_code(link: &str) -> String {
    QrCode::new(link)
        .map(|code| {
            code.render::<unicode::Dense1x2>()
                .dark_color(unicode::Dense1x2::Dark)
                .light_color(unicode::Dense1x2::Light)
                .quiet_zone(true)
                .build()
        })
        .unwrap_or_default()
}
