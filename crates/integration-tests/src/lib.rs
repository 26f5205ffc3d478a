//! Integration tests for the Doko state engine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p doko-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_store` - Cart store behavior across a session
//! - `wishlist_store` - Wishlist store and move-to-cart
//! - `persistence` - Snapshots on disk, failing backends, corrupt records
//!
//! Shared fixtures live here so each test file builds products the same way.

#![cfg_attr(not(test), forbid(unsafe_code))]

use rust_decimal::Decimal;

use doko_core::{Price, ProductId, ProductSummary};

/// A product priced in whole rupees.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn product(id: &str, name: &str, rupees: i64) -> ProductSummary {
    ProductSummary::new(
        ProductId::parse(id).unwrap(),
        name,
        Price::npr(Decimal::from(rupees)).unwrap(),
    )
}

/// Parse a product id.
///
/// # Panics
///
/// Panics if `id` is blank.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn id(id: &str) -> ProductId {
    ProductId::parse(id).unwrap()
}
