//! Per-session handle bundling the cart and wishlist.
//!
//! The UI layer creates one [`StorefrontSession`] when a session starts,
//! passes it to whatever needs cart or wishlist access, and closes it at the
//! end. Both stores share one notifier so a single toast area shows messages
//! from either.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, instrument};

use doko_core::ProductId;

use crate::cart::CartStore;
use crate::checkout::{CheckoutSummary, ShippingPolicy};
use crate::config::EngineConfig;
use crate::error::CartError;
use crate::notify::{Notification, Notifier};
use crate::persistence::{DurableStore, FileStore};
use crate::wishlist::WishlistStore;

/// Cart, wishlist, and their shared notifier for one session.
#[derive(Debug)]
pub struct StorefrontSession {
    cart: CartStore,
    wishlist: WishlistStore,
    notifier: Notifier,
    shipping: ShippingPolicy,
}

impl StorefrontSession {
    /// Open both stores against `storage`.
    pub async fn open(storage: Arc<dyn DurableStore>, config: &EngineConfig) -> Self {
        let notifier = Notifier::default();
        let cart = CartStore::open(storage.clone(), config.cart_options(), notifier.clone()).await;
        let wishlist =
            WishlistStore::open(storage, config.wishlist_options(), notifier.clone()).await;

        info!(
            cart_items = cart.items().len(),
            wishlist_items = wishlist.count(),
            "Session opened"
        );

        Self {
            cart,
            wishlist,
            notifier,
            shipping: config.shipping,
        }
    }

    /// Open both stores against files in `config.state_dir`.
    #[instrument(skip(config), fields(dir = %config.state_dir.display()))]
    pub async fn open_in_dir(config: &EngineConfig) -> Self {
        let storage: Arc<dyn DurableStore> = Arc::new(FileStore::new(config.state_dir.clone()));
        Self::open(storage, config).await
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    #[must_use]
    pub const fn wishlist(&self) -> &WishlistStore {
        &self.wishlist
    }

    pub fn wishlist_mut(&mut self) -> &mut WishlistStore {
        &mut self.wishlist
    }

    /// Listen for toast notifications from either store.
    #[must_use]
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Checkout totals for the current cart.
    #[must_use]
    pub fn checkout_summary(&self) -> CheckoutSummary {
        self.cart.checkout_summary(&self.shipping)
    }

    /// Move a saved product into the cart with quantity 1.
    ///
    /// The cart add runs first; if it is rejected the product stays in the
    /// wishlist. Returns `false` if the product was not saved.
    ///
    /// # Errors
    ///
    /// Returns the cart's error if the add is rejected.
    pub fn move_to_cart(&mut self, product_id: &ProductId) -> Result<bool, CartError> {
        let Some(item) = self.wishlist.state().get(product_id) else {
            return Ok(false);
        };
        self.cart.add_item(item.to_product(), 1)?;
        Ok(self.wishlist.move_to_cart(product_id).is_some())
    }

    /// Flush pending writes for both stores.
    pub async fn flush(&self) {
        self.cart.flush().await;
        self.wishlist.flush().await;
    }

    /// Flush and shut down both stores.
    pub async fn close(self) {
        self.cart.close().await;
        self.wishlist.close().await;
        info!("Session closed");
    }
}
