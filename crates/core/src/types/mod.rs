//! Core types for Doko.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coupon;
pub mod id;
pub mod price;
pub mod product;

pub use coupon::{CouponCode, CouponError};
pub use id::{IdError, ProductId};
pub use price::{CurrencyCode, Price, PriceError};
pub use product::ProductSummary;
