//! Wishlist subcommands.

use tracing::info;

use doko_core::ProductSummary;
use doko_state::StorefrontSession;

use super::{CommandError, parse_id, parse_price};

/// Save a product.
///
/// # Errors
///
/// Returns an error if the id or price is malformed.
pub fn add(
    session: &mut StorefrontSession,
    id: &str,
    price: &str,
    name: Option<&str>,
) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    let price = parse_price(price)?;
    let name = name.unwrap_or(id.as_str()).to_string();

    if !session
        .wishlist_mut()
        .add_item(ProductSummary::new(id.clone(), name, price))
    {
        info!(product = %id, "Already in wishlist");
    }
    Ok(())
}

/// Remove a saved product.
///
/// # Errors
///
/// Returns an error if the id is malformed.
pub fn remove(session: &mut StorefrontSession, id: &str) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    if session.wishlist_mut().remove_item(&id) {
        info!(product = %id, "Removed from wishlist");
    } else {
        info!(product = %id, "Not in wishlist");
    }
    Ok(())
}

pub fn clear(session: &mut StorefrontSession) {
    session.wishlist_mut().clear();
    info!("Wishlist cleared");
}

/// Move a saved product into the cart.
///
/// # Errors
///
/// Returns an error if the id is malformed, the product is not saved, or the
/// cart rejects it.
pub fn move_to_cart(session: &mut StorefrontSession, id: &str) -> Result<(), CommandError> {
    let id = parse_id(id)?;
    if !session.move_to_cart(&id)? {
        return Err(CommandError::NotInWishlist(id));
    }
    Ok(())
}

/// Log saved products, oldest first.
pub fn show(session: &StorefrontSession) {
    let wishlist = session.wishlist();
    if wishlist.items().is_empty() {
        info!("Wishlist is empty");
    }
    for item in wishlist.items() {
        info!(
            "  {} @ {}  saved {}  [{}]",
            item.name,
            item.price,
            item.added_at.format("%Y-%m-%d"),
            item.product_id
        );
    }
    info!("{} saved", wishlist.count());
}
