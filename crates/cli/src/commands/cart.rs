//! Cart subcommands.

use tracing::info;

use doko_core::ProductSummary;
use doko_state::{StorefrontSession, parse_quantity};

use super::{CommandError, parse_coupon, parse_id, parse_price};

/// Add `qty` units of a product.
///
/// # Errors
///
/// Returns an error if the id or price is malformed or the cart rejects the
/// quantity.
pub fn add(
    session: &mut StorefrontSession,
    id: &str,
    price: &str,
    qty: u32,
    name: Option<&str>,
) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    let price = parse_price(price)?;
    let name = name.unwrap_or(id.as_str()).to_string();

    session
        .cart_mut()
        .add_item(ProductSummary::new(id, name, price), qty)?;
    info!(count = session.cart().count(), "Cart updated");
    Ok(())
}

/// Remove a product's line.
///
/// # Errors
///
/// Returns an error if the id is malformed.
pub fn remove(session: &mut StorefrontSession, id: &str) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    if session.cart_mut().remove_item(&id) {
        info!(product = %id, "Removed from cart");
    } else {
        info!(product = %id, "Not in cart");
    }
    Ok(())
}

/// Set an exact quantity from raw input.
///
/// # Errors
///
/// Returns an error if the id is malformed or the quantity is not a
/// non-negative whole number.
pub fn set_quantity(session: &mut StorefrontSession, id: &str, qty: &str) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    let quantity = parse_quantity(qty)?;
    session.cart_mut().set_quantity(&id, quantity)?;
    info!(product = %id, quantity, "Quantity set");
    Ok(())
}

pub fn clear(session: &mut StorefrontSession) {
    session.cart_mut().clear();
    info!("Cart cleared");
}

/// Apply a coupon, replacing any active one.
///
/// # Errors
///
/// Returns an error if the code is blank or too long.
pub fn apply_coupon(session: &mut StorefrontSession, code: &str) -> Result<(), CommandError> {
    let code = parse_coupon(code)?;
    info!(coupon = %code, "Coupon applied");
    session.cart_mut().apply_coupon(code);
    Ok(())
}

pub fn remove_coupon(session: &mut StorefrontSession) {
    if session.cart_mut().remove_coupon() {
        info!("Coupon removed");
    }
}

/// Log the cart contents and checkout totals.
pub fn show(session: &StorefrontSession) {
    let cart = session.cart();
    if cart.items().is_empty() {
        info!("Cart is empty");
    }
    for item in cart.items() {
        let line_total = item
            .line_total()
            .map_or_else(|e| e.to_string(), |total| total.to_string());
        info!(
            "  {} x{} @ {} = {}  [{}]",
            item.name, item.quantity, item.unit_price, line_total, item.product_id
        );
    }

    let summary = session.checkout_summary();
    if let Some(coupon) = &summary.coupon {
        info!("Coupon: {coupon}");
    }
    info!("Subtotal: {}", summary.subtotal);
    info!("Delivery: {}", summary.delivery_label());
    info!("Total ({}): {}", summary.item_label(), summary.total);
}
