//! Transient UI notifications ("Dhaka Topi added to cart!").
//!
//! Publishing is fire-and-forget: the notifier never waits for listeners and
//! does not care whether anyone is listening. A toast component subscribes
//! and renders whatever arrives.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// How long a toast stays on screen unless configured otherwise.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(3000);

const CHANNEL_CAPACITY: usize = 32;

/// Visual style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Success,
    Info,
    Error,
}

/// A short-lived message for the toast UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// Display duration.
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl Notification {
    /// A success notification with the given display duration.
    #[must_use]
    pub fn success(message: impl Into<String>, duration: Duration) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
            duration,
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Broadcast hub for notifications.
///
/// Cheap to clone; clones share the same channel so the cart and wishlist can
/// feed one toast area.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    /// Create a notifier whose listeners may fall `capacity` messages behind
    /// before they start missing old ones.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a listener.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Publish without blocking. Dropped silently when nobody listens.
    pub fn publish(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::trace!("No notification listeners");
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}
