//! # Broadcast bus for run lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. A runner
//! publishes into it at each lifecycle point; any number of observers may
//! subscribe.
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no active receivers the
//!   event is simply dropped.
//! - Capacity is a bounded ring buffer shared by all receivers; a slow
//!   receiver observes `RecvError::Lagged(n)` and skips the `n` oldest
//!   events.
//! - A receiver only sees events published after it subscribed.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for run lifecycle events.
///
/// Cheap to clone; clones publish into the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given ring-buffer capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active subscribers, if any.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver observing subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
