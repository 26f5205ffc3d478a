//! Subcommand implementations.

use thiserror::Error;

use doko_core::{CouponCode, CouponError, CurrencyCode, IdError, Price, PriceError, ProductId};
use doko_state::CartError;

pub mod cart;
pub mod wishlist;

/// Errors surfaced to the user by a subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Invalid product id: {0}")]
    InvalidId(#[from] IdError),

    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    #[error("Invalid coupon: {0}")]
    InvalidCoupon(#[from] CouponError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("{0} is not saved in the wishlist")]
    NotInWishlist(ProductId),
}

fn parse_id(raw: &str) -> Result<ProductId, CommandError> {
    Ok(ProductId::parse(raw)?)
}

fn parse_price(raw: &str) -> Result<Price, CommandError> {
    Ok(Price::parse(raw, CurrencyCode::NPR)?)
}

fn parse_coupon(raw: &str) -> Result<CouponCode, CommandError> {
    Ok(CouponCode::parse(raw)?)
}
