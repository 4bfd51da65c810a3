//! Camera event notifications.
//!
//! Push notifications (motion alerts and the like) arrive from outside the
//! streaming core; this module is the boundary surface consumers register
//! against. Registration hands back an explicit [`Subscription`] handle;
//! dropping it (or calling [`unsubscribe`](Subscription::unsubscribe))
//! deregisters the receiver. There is no global listener list; hubs are
//! plain owned values.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// One pushed camera event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub cam_key: String,
    /// Event kind as reported by the service, e.g. `motion`.
    pub kind: String,
    pub message: String,
    pub camera_name: String,
    /// Service-side creation time, RFC 3339.
    pub created_at: String,
}

/// Fan-out point for camera notifications.
///
/// Slow subscribers that fall behind the channel capacity miss older
/// events rather than blocking the publisher.
pub struct NotificationHub {
    tx: broadcast::Sender<Notification>,
}

impl NotificationHub {
    /// Create a hub buffering up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Deliver an event to all current subscribers. Returns how many
    /// subscribers received it.
    pub fn publish(&self, notification: Notification) -> usize {
        trace!(cam_key = %notification.cam_key, kind = %notification.kind, "notification");
        self.tx.send(notification).unwrap_or(0)
    }

    /// Register a subscriber. The returned handle receives every event
    /// published after this call until it is dropped or unsubscribed.
    pub fn subscribe(&self) -> Subscription {
        Subscription { rx: self.tx.subscribe() }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Handle for one registered notification receiver.
pub struct Subscription {
    rx: broadcast::Receiver<Notification>,
}

impl Subscription {
    /// Wait for the next event. Returns `None` once the hub is gone. A
    /// subscription that lagged past the buffer skips to the oldest
    /// retained event instead of erroring.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                // Lagged: skip to the oldest retained event.
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Explicitly deregister. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}
