//! User notification channel.
//!
//! The store emits exactly one [`Notice`] per failed operation and nothing on
//! success. Sinks decide how to surface it (log line, toast bus, console).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

use crate::error::{CartError, CartErrorKind};
use rks_schemas::ProductId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: CartErrorKind,
    pub product_id: ProductId,
    /// Human-readable message, ready to display.
    pub message: String,
}

impl From<&CartError> for Notice {
    fn from(err: &CartError) -> Self {
        Self {
            kind: err.kind(),
            product_id: err.product_id(),
            message: err.to_string(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log. Default sink when nothing else listens.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        warn!(kind = ?notice.kind, product_id = %notice.product_id, "{}", notice.message);
    }
}

/// Fans notices out over a tokio broadcast bus (toast-style subscribers).
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    bus: broadcast::Sender<Notice>,
}

impl BroadcastNotifier {
    /// `capacity` is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let (bus, _rx) = broadcast::channel(capacity.max(1));
        Self { bus }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.bus.subscribe()
    }
}

impl Notifier for BroadcastNotifier {
    fn notify(&self, notice: Notice) {
        // No subscribers is fine: nobody is showing toasts right now.
        let _ = self.bus.send(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_delivers_to_subscribers() {
        let n = BroadcastNotifier::new(8);
        let mut rx = n.subscribe();

        let err = CartError::ProductNotFound {
            product_id: ProductId(4),
        };
        n.notify(Notice::from(&err));

        let got = rx.recv().await.unwrap();
        assert_eq!(got.kind, CartErrorKind::ProductNotFound);
        assert_eq!(got.product_id, ProductId(4));
        assert_eq!(got.message, "Product is not in the cart");
    }

    #[test]
    fn broadcast_without_subscribers_does_not_panic() {
        let n = BroadcastNotifier::new(1);
        n.notify(Notice {
            kind: CartErrorKind::InvalidAmount,
            product_id: ProductId(1),
            message: "Quantity must be at least 1".to_string(),
        });
    }

    #[tokio::test]
    async fn zero_capacity_is_clamped() {
        let n = BroadcastNotifier::new(0);
        let mut rx = n.subscribe();
        n.notify(Notice {
            kind: CartErrorKind::InvalidAmount,
            product_id: ProductId(2),
            message: "Quantity must be at least 1".to_string(),
        });
        assert_eq!(rx.recv().await.unwrap().product_id, ProductId(2));
    }
}
