//! Single-slot publish/subscribe state container.
//!
//! Each derived stream (interval list, live elapsed seconds, activity feed)
//! lives in exactly one cell. Writers replace the whole value; readers get
//! complete snapshots or a change-notified receiver. Last write wins, no
//! partial updates are ever observable.

use tokio::sync::watch;

pub struct StateCell<T> {
    tx: std::sync::Arc<watch::Sender<T>>,
}

impl<T> Clone for StateCell<T> {
    fn clone(&self) -> Self {
        Self {
            tx: std::sync::Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone> StateCell<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// Replaces the current value and notifies subscribers.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Mutates the value in place and notifies subscribers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.tx.send_modify(f);
    }

    /// Returns a snapshot of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Registers a reader. Receivers observe complete values only and cannot
    /// mutate the cell.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }
}
