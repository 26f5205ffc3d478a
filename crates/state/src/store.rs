//! Generic reducer-backed store.
//!
//! A [`Store`] owns one piece of state for the lifetime of a session:
//!
//! 1. `open` hydrates it from durable storage (awaited once)
//! 2. `dispatch` runs the pure reducer synchronously
//! 3. on change, subscribers are told, a snapshot write is queued, and a
//!    notification is published
//! 4. `close` flushes pending writes and stops the writer
//!
//! Stores are driven from a single task, so `dispatch` takes `&mut self` and
//! needs no locking.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, instrument, warn};

use crate::notify::{DEFAULT_DURATION, Notification, Notifier};
use crate::persistence::{self, DurableStore, SnapshotWriter};

/// A pure state transition function plus the hooks the store needs.
pub trait Reducer: Send + Sync + 'static {
    type State: Clone
        + PartialEq
        + Default
        + fmt::Debug
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;
    type Action: fmt::Debug;
    type Error: std::error::Error;

    /// Compute the next state. Must not perform I/O.
    ///
    /// # Errors
    ///
    /// Returns an error when the action is rejected; the state is unchanged.
    fn reduce(state: &Self::State, action: &Self::Action) -> Result<Self::State, Self::Error>;

    /// Check invariants on state that did not come from `reduce`.
    ///
    /// # Errors
    ///
    /// Returns a description of the violation.
    fn validate(state: &Self::State) -> Result<(), String>;

    /// Whether the action is one the reducer knows about.
    fn is_recognized(action: &Self::Action) -> bool;

    /// Message to show when this action changes the state.
    fn announce(action: &Self::Action) -> Option<String>;
}

/// Per-store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Storage key for this store's snapshot.
    pub key: String,
    /// How long "added" notifications stay on screen.
    pub notification_duration: Duration,
}

impl StoreOptions {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            notification_duration: DEFAULT_DURATION,
        }
    }
}

/// Reducer-backed state with persistence and change notification.
#[derive(Debug)]
pub struct Store<R: Reducer> {
    state: R::State,
    changes: watch::Sender<R::State>,
    writer: SnapshotWriter,
    notifier: Notifier,
    notification_duration: Duration,
}

impl<R: Reducer> Store<R> {
    /// Hydrate from `storage` and start the snapshot writer.
    ///
    /// Never fails: unreadable snapshots are logged and replaced by empty
    /// state. Must be called inside a Tokio runtime.
    #[instrument(skip(storage, notifier), fields(key = %options.key))]
    pub async fn open(
        storage: Arc<dyn DurableStore>,
        options: StoreOptions,
        notifier: Notifier,
    ) -> Self {
        let state = persistence::hydrate::<R>(storage.as_ref(), &options.key).await;
        let (changes, _) = watch::channel(state.clone());
        let writer = SnapshotWriter::spawn(storage, options.key);

        Self {
            state,
            changes,
            writer,
            notifier,
            notification_duration: options.notification_duration,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &R::State {
        &self.state
    }

    /// Storage key of this store.
    #[must_use]
    pub fn key(&self) -> &str {
        self.writer.key()
    }

    /// Receive the new state after every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<R::State> {
        self.changes.subscribe()
    }

    /// Notifier this store publishes to.
    #[must_use]
    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Apply an action.
    ///
    /// Returns whether the state changed.
    ///
    /// # Errors
    ///
    /// Returns the reducer's error if the action is rejected; state,
    /// subscribers, storage, and notifications are left untouched.
    #[instrument(skip(self), fields(key = %self.writer.key()))]
    pub fn dispatch(&mut self, action: R::Action) -> Result<bool, R::Error> {
        if !R::is_recognized(&action) {
            warn!("Ignoring unrecognized action");
            return Ok(false);
        }

        let next = R::reduce(&self.state, &action).inspect_err(|e| {
            debug!(error = %e, "Action rejected");
        })?;
        if next == self.state {
            debug!("Action left state unchanged");
            return Ok(false);
        }

        self.state = next;
        self.changes.send_replace(self.state.clone());
        self.persist();

        if let Some(message) = R::announce(&action) {
            self.notifier
                .publish(Notification::success(message, self.notification_duration));
        }
        Ok(true)
    }

    fn persist(&self) {
        match persistence::encode(&self.state) {
            Ok(payload) => self.writer.queue(payload),
            Err(e) => error!(error = %e, "Failed to encode snapshot"),
        }
    }

    /// Wait for queued snapshot writes.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    /// Flush pending writes and end the store's lifetime.
    pub async fn close(self) {
        self.writer.close().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use doko_core::{Price, ProductId, ProductSummary};

    use super::*;
    use crate::cart::{CartAction, CartReducer, CartState};
    use crate::error::CartError;
    use crate::persistence::MemoryStore;

    fn topi() -> ProductSummary {
        ProductSummary::new(
            ProductId::parse("sku-1").unwrap(),
            "Dhaka Topi",
            Price::npr(Decimal::from(1749)).unwrap(),
        )
    }

    async fn open_cart(storage: Arc<MemoryStore>) -> Store<CartReducer> {
        Store::<CartReducer>::open(storage, StoreOptions::new("doko_cart"), Notifier::default())
            .await
    }

    #[tokio::test]
    async fn test_dispatch_updates_subscribers_storage_and_toasts() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open_cart(storage.clone()).await;
        let mut changes = store.subscribe();
        let mut toasts = store.notifier().subscribe();

        let changed = store
            .dispatch(CartAction::AddItem {
                product: topi(),
                quantity: 1,
            })
            .unwrap();
        assert!(changed);

        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().count(), 1);

        let toast = toasts.recv().await.unwrap();
        assert_eq!(toast.message, "Dhaka Topi added to cart!");
        assert_eq!(toast.duration, DEFAULT_DURATION);

        store.flush().await;
        let raw = storage.get("doko_cart").unwrap();
        let saved = persistence::decode::<CartReducer>("doko_cart", &raw).unwrap();
        assert_eq!(&saved, store.state());
    }

    #[tokio::test]
    async fn test_rejected_action_changes_nothing() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open_cart(storage.clone()).await;
        let changes = store.subscribe();

        let result = store.dispatch(CartAction::AddItem {
            product: topi(),
            quantity: 0,
        });
        assert!(matches!(result, Err(CartError::InvalidQuantity(_))));
        assert_eq!(store.state(), &CartState::default());
        assert!(!changes.has_changed().unwrap());

        store.flush().await;
        assert!(storage.get("doko_cart").is_none());
    }

    #[tokio::test]
    async fn test_unknown_action_is_ignored() {
        let mut store = open_cart(Arc::new(MemoryStore::new())).await;
        assert!(!store.dispatch(CartAction::Unknown).unwrap());
    }

    #[tokio::test]
    async fn test_noop_does_not_notify() {
        let mut store = open_cart(Arc::new(MemoryStore::new())).await;
        let changes = store.subscribe();
        let changed = store
            .dispatch(CartAction::RemoveItem {
                product_id: ProductId::parse("sku-404").unwrap(),
            })
            .unwrap();
        assert!(!changed);
        assert!(!changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_open_hydrates_previous_session() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = open_cart(storage.clone()).await;
        store
            .dispatch(CartAction::AddItem {
                product: topi(),
                quantity: 2,
            })
            .unwrap();
        store.close().await;

        let reopened = open_cart(storage).await;
        assert_eq!(reopened.state().count(), 2);
        assert_eq!(reopened.key(), "doko_cart");
    }
}
