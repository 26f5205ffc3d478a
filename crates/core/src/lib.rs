//! Doko Core - Shared domain types.
//!
//! This crate provides the types passed between the storefront UI and the
//! client-side state engine:
//! - `state` - Cart and wishlist reducers, persistence, and notifications
//! - `cli` - Command-line driver for the state engine
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no clocks.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, coupon codes, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
