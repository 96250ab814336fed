// SPDX-FileCopyrightText: 2026 Shiftswap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A small observable state container.
//!
//! Every client-side store holds its state in an [`Observable`]: mutations
//! go through [`Observable::patch`], which applies the change under the
//! state lock, takes a cloned snapshot, and then invokes every subscriber
//! synchronously with that snapshot (push model, no polling). Subscribers
//! are invoked outside both locks, so a callback may subscribe,
//! unsubscribe, or read state without deadlocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Handle returned by [`Observable::subscribe`]; pass it back to
/// [`Observable::unsubscribe`] to stop receiving snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback<S> = Arc<dyn Fn(&S) + Send + Sync>;

/// Observable state cell with synchronous change notification.
pub struct Observable<S> {
    state: Mutex<S>,
    subscribers: Mutex<Vec<(u64, Callback<S>)>>,
    next_id: AtomicU64,
}

impl<S: Clone> Observable<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: Mutex::new(initial),
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns a clone of the current state.
    pub fn get(&self) -> S {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers a callback invoked with a snapshot after every patch.
    pub fn subscribe(&self, callback: impl Fn(&S) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(callback)));
        SubscriptionId(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(sub_id, _)| *sub_id != id.0);
    }

    /// Applies a mutation and notifies every subscriber with the resulting
    /// snapshot. Returns the snapshot.
    pub fn patch(&self, apply: impl FnOnce(&mut S)) -> S {
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            apply(&mut state);
            state.clone()
        };
        let callbacks: Vec<Callback<S>> = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for callback in callbacks {
            callback(&snapshot);
        }
        snapshot
    }
}

impl<S: Clone + Default> Default for Observable<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn patch_notifies_with_the_new_snapshot() {
        let cell = Observable::new(0u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        cell.subscribe(move |value| sink.lock().unwrap().push(*value));

        cell.patch(|v| *v += 1);
        cell.patch(|v| *v += 2);

        assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let cell = Observable::new(0u32);
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let id = cell.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        cell.patch(|v| *v += 1);
        cell.unsubscribe(id);
        cell.patch(|v| *v += 1);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn subscriber_may_read_state_without_deadlock() {
        let cell = Arc::new(Observable::new(0u32));
        let reader = Arc::clone(&cell);
        let seen = Arc::new(Mutex::new(0u32));
        let sink = Arc::clone(&seen);
        cell.subscribe(move |_| {
            *sink.lock().unwrap() = reader.get();
        });

        cell.patch(|v| *v = 7);
        assert_eq!(*seen.lock().unwrap(), 7);
    }

    #[test]
    fn multiple_subscribers_all_run() {
        let cell = Observable::new(0u32);
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let counter = Arc::clone(&count);
            cell.subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        cell.patch(|v| *v += 1);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
