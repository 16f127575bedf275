/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Per-subscriber snapshot fan-out, spec §5 "Notification fan-out" and §9
//! "Snapshot fan-out 'latest only' semantics".
//!
//! Each subscriber gets a small bounded mailbox (default capacity 5) plus a
//! single-slot "latest" cell. Delivery is non-blocking: on a full mailbox the
//! producer drains it and pushes only the latest snapshot, so a slow
//! consumer sees the most recent state, possibly skipping intermediate ones,
//! rather than growing memory unboundedly or stalling the engine. Grounded
//! on the teacher crate's `crossbeam::atomic::AtomicCell` use for its own
//! scalar market-reference prices, generalized here to a `Snapshot`-sized
//! "latest" cell (spec §9's explicit suggestion).

use crate::book::snapshot::Snapshot;
use crossbeam::atomic::AtomicCell;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::trace;

/// Default mailbox capacity (spec §5: "e.g. capacity 5").
pub const DEFAULT_MAILBOX_CAPACITY: usize = 5;

struct Mailbox {
    queue: Mutex<VecDeque<Arc<Snapshot>>>,
    notify: Notify,
    capacity: usize,
    latest: AtomicCell<Option<Arc<Snapshot>>>,
}

impl Mailbox {
    fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            capacity,
            latest: AtomicCell::new(None),
        }
    }

    /// Non-blocking publish: if the consumer hasn't drained the previous
    /// snapshot yet, drop it and push only the latest (overwrite-old
    /// semantics), so the consumer is never more than one snapshot behind
    /// regardless of how many publishes land before the next `recv`.
    fn publish(&self, snap: Arc<Snapshot>) {
        self.latest.swap(Some(snap.clone()));
        let mut q = self.queue.lock().expect("mailbox queue mutex poisoned");
        if !q.is_empty() {
            trace!("fanout: mailbox has an unconsumed snapshot, replacing with latest");
            q.clear();
        }
        q.push_back(snap);
        drop(q);
        self.notify.notify_one();
    }

    async fn recv(&self) -> Arc<Snapshot> {
        loop {
            {
                let mut q = self.queue.lock().expect("mailbox queue mutex poisoned");
                if let Some(v) = q.pop_front() {
                    return v;
                }
            }
            self.notify.notified().await;
        }
    }

    /// A synchronous peek at the most recently published snapshot, without
    /// consuming from the mailbox.
    fn latest(&self) -> Option<Arc<Snapshot>> {
        let current = self.latest.swap(None);
        if let Some(ref s) = current {
            self.latest.swap(Some(s.clone()));
        }
        current
    }
}

type SubscriberMap = Arc<Mutex<HashMap<u64, Arc<Mailbox>>>>;

/// The registry of active subscribers for one engine, spec §5's
/// per-subscriber bounded mailbox fan-out.
pub struct FanoutRegistry {
    next_id: AtomicU64,
    subscribers: SubscriberMap,
}

impl Default for FanoutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FanoutRegistry {
    /// A fresh registry with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers a new subscriber with the default mailbox capacity.
    pub fn subscribe(&self) -> Subscription {
        self.subscribe_with_capacity(DEFAULT_MAILBOX_CAPACITY)
    }

    /// Registers a new subscriber with a custom mailbox capacity.
    pub fn subscribe_with_capacity(&self, capacity: usize) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mailbox = Arc::new(Mailbox::new(capacity));
        self.subscribers
            .lock()
            .expect("subscriber registry mutex poisoned")
            .insert(id, mailbox.clone());
        Subscription {
            id,
            mailbox,
            subscribers: self.subscribers.clone(),
        }
    }

    /// Publishes `snapshot` to every registered subscriber.
    pub fn publish(&self, snapshot: Snapshot) {
        let snap = Arc::new(snapshot);
        let subs = self.subscribers.lock().expect("subscriber registry mutex poisoned");
        for mailbox in subs.values() {
            mailbox.publish(snap.clone());
        }
    }

    /// Current number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().expect("subscriber registry mutex poisoned").len()
    }
}

/// A live subscription to a symbol's snapshot stream, spec §5/§6
/// "Subscription interface". Cancellable by dropping (spec §5
/// "Cancellation"): the fan-out side unregisters the slot and releases the
/// mailbox.
pub struct Subscription {
    id: u64,
    mailbox: Arc<Mailbox>,
    subscribers: SubscriberMap,
}

impl Subscription {
    /// Waits for the next snapshot, possibly skipping intermediate ones if
    /// this subscriber has fallen behind.
    pub async fn recv(&self) -> Arc<Snapshot> {
        self.mailbox.recv().await
    }

    /// A synchronous peek at the most recently published snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.mailbox.latest()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers
            .lock()
            .expect("subscriber registry mutex poisoned")
            .remove(&self.id);
    }
}
