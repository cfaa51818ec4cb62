//! Creation notifications.
//!
//! `dispatch` announces every verified conditional order as
//! `(owner, payload)`. Subscribers (indexers, watchers) filter by owner.
//! Sending with no subscriber connected is normal and not an error.

use alloy::primitives::{Address, Bytes};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

/// A conditional order was created (or re-announced) by `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreated {
    pub owner: Address,
    pub payload: Bytes,
}

/// Fan-out of [`OrderCreated`] notifications.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<OrderCreated>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OrderCreated> {
        self.tx.subscribe()
    }

    /// Send to all current subscribers. Returns how many received it.
    pub fn emit(&self, event: OrderCreated) -> usize {
        match self.tx.send(event) {
            Ok(n) => {
                trace!(receivers = n, "OrderCreated sent");
                n
            }
            Err(_) => {
                // No receivers - normal when nobody is indexing
                trace!("No OrderCreated receivers connected");
                0
            }
        }
    }
}
