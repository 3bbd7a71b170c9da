//! Synchronous handoff channel
//!
//! A multi-producer, multi-consumer channel with rendezvous semantics:
//! [`HandoffSender::send`] returns only once some receiver has taken the item.
//! Nothing is ever queued behind a busy pool, which makes the send itself the
//! pool's backpressure.
//!
//! Each item travels with a oneshot acknowledgment the receiver fires the
//! moment it dequeues the item. Receivers also share a liveness guard, so a
//! sender waiting on an acknowledgment learns about a pool with no receivers
//! left instead of waiting forever.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{oneshot, watch};

/// Every receiver (or every sender) is gone
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("handoff channel closed")]
pub struct Closed;

struct Parcel<T> {
    item: T,
    taken: oneshot::Sender<()>,
}

/// Sending half; cloneable for many producers
pub struct HandoffSender<T> {
    tx: async_channel::Sender<Parcel<T>>,
    receivers_alive: watch::Receiver<()>,
}

/// Receiving half; cloneable for many consumers
///
/// Each item is delivered to exactly one receiver.
pub struct HandoffReceiver<T> {
    rx: async_channel::Receiver<Parcel<T>>,
    _alive: Arc<watch::Sender<()>>,
}

/// Creates a new handoff channel
pub fn handoff<T>() -> (HandoffSender<T>, HandoffReceiver<T>) {
    // One slot: a parcel sits there only while its sender waits for the ack
    let (tx, rx) = async_channel::bounded(1);
    let (alive_tx, alive_rx) = watch::channel(());

    (
        HandoffSender {
            tx,
            receivers_alive: alive_rx,
        },
        HandoffReceiver {
            rx,
            _alive: Arc::new(alive_tx),
        },
    )
}

impl<T> HandoffSender<T> {
    /// Hands `item` to a receiver, waiting until one has taken it
    ///
    /// Returns `Err(Closed)` if every receiver is gone, whether that happens
    /// before the call or while waiting. The item is dropped in that case.
    ///
    /// Cancelling this future after the item was queued does not withdraw
    /// it; a receiver may still take it later.
    pub async fn send(&self, item: T) -> Result<(), Closed> {
        let (taken_tx, mut taken_rx) = oneshot::channel();
        let mut alive = self.receivers_alive.clone();

        self.tx
            .send(Parcel {
                item,
                taken: taken_tx,
            })
            .await
            .map_err(|_| Closed)?;

        tokio::select! {
            biased;
            taken = &mut taken_rx => taken.map_err(|_| Closed),
            _ = alive.changed() => {
                // The last receiver may have taken the parcel right before leaving
                taken_rx.try_recv().map_err(|_| Closed)
            }
        }
    }
}

impl<T> HandoffReceiver<T> {
    /// Waits for the next item, acknowledging it to its sender
    ///
    /// Returns `Err(Closed)` once every sender is gone. Dropping this future
    /// before it completes never loses an item.
    pub async fn recv(&self) -> Result<T, Closed> {
        let parcel = self.rx.recv().await.map_err(|_| Closed)?;
        let _ = parcel.taken.send(());
        Ok(parcel.item)
    }
}

impl<T> Clone for HandoffSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            receivers_alive: self.receivers_alive.clone(),
        }
    }
}

impl<T> Clone for HandoffReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            _alive: Arc::clone(&self._alive),
        }
    }
}
