//! Doko State - Client-side cart and wishlist engine.
//!
//! Holds the shopper's cart and wishlist for one session, saves them to a
//! durable key-value store, and tells the UI when they change.
//!
//! # Architecture
//!
//! ```text
//! UI action → Store::dispatch → pure reducer → new state
//!                                   ├→ watch subscribers (re-render)
//!                                   ├→ SnapshotWriter (background save)
//!                                   └→ Notifier (toast)
//! ```
//!
//! Reducers ([`cart::reduce`], [`wishlist::reduce`]) are pure and can be
//! tested without storage. All I/O lives in [`persistence`].
//!
//! # Modules
//!
//! - [`cart`] - Cart state, actions, reducer, and store conveniences
//! - [`wishlist`] - Wishlist state, actions, reducer, and store conveniences
//! - [`checkout`] - Subtotal, delivery, and total for the checkout page
//! - [`store`] - Generic reducer-backed store
//! - [`persistence`] - Durable storage backends and snapshot encoding
//! - [`notify`] - Toast notifications
//! - [`session`] - Per-session handle owning both stores
//! - [`config`] - Environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod session;
pub mod store;
pub mod wishlist;

pub use cart::{CartAction, CartReducer, CartState, CartStore, LineItem, parse_quantity};
pub use checkout::{CheckoutSummary, ShippingPolicy};
pub use config::{ConfigError, EngineConfig};
pub use error::{CartError, PersistenceError};
pub use notify::{Notification, NotificationKind, Notifier};
pub use persistence::{DurableStore, FileStore, MemoryStore, SCHEMA_VERSION};
pub use session::StorefrontSession;
pub use store::{Reducer, Store, StoreOptions};
pub use wishlist::{WishlistAction, WishlistItem, WishlistReducer, WishlistState, WishlistStore};
