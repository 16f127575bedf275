/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! `Level`: the FIFO queue of resting order ids at one price, side, and map
//! kind, plus its aggregate volume. Spec §3/§4.2.

use crate::book::error::OrderBookError;
use crate::book::order::{MapKind, Side};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// A price level: an ordered queue of order ids plus their aggregate open
/// quantity. Levels never hold the orders themselves — the `OrderBook`'s id
/// index is the single owner, per the arena-style reshape in spec §9.
#[derive(Debug)]
pub struct Level {
    /// The side every order in this level shares.
    pub side: Side,
    /// Which `LevelMap` this level lives in.
    pub kind: MapKind,
    /// The price this level is keyed by (order.price for limit levels,
    /// order.stopPrice for stop/trailing-stop levels).
    pub key_price: u64,
    /// The symbol every order in this level shares.
    pub symbol_id: u64,
    queue: Mutex<VecDeque<u64>>,
    volume: AtomicU64,
}

impl Level {
    /// A freshly created, empty level.
    #[must_use]
    pub fn new(side: Side, kind: MapKind, key_price: u64, symbol_id: u64) -> Self {
        Self {
            side,
            kind,
            key_price,
            symbol_id,
            queue: Mutex::new(VecDeque::new()),
            volume: AtomicU64::new(0),
        }
    }

    /// Current aggregate open quantity across the queue.
    #[must_use]
    pub fn volume(&self) -> u64 {
        self.volume.load(Ordering::Acquire)
    }

    /// True when the queue holds no orders.
    #[must_use]
    pub fn empty(&self) -> bool {
        self.queue.lock().expect("level queue mutex poisoned").is_empty()
    }

    /// The id of the front (oldest-arrived) order, if any.
    #[must_use]
    pub fn front(&self) -> Option<u64> {
        self.queue
            .lock()
            .expect("level queue mutex poisoned")
            .front()
            .copied()
    }

    /// The id of the back (most-recently-arrived) order, if any.
    #[must_use]
    pub fn back(&self) -> Option<u64> {
        self.queue
            .lock()
            .expect("level queue mutex poisoned")
            .back()
            .copied()
    }

    /// Appends an order to the back of the queue and adds `open_quantity`
    /// to volume. Caller must have already checked side/symbol/key match.
    pub fn add_order(&self, order_id: u64, open_quantity: u64) {
        self.queue
            .lock()
            .expect("level queue mutex poisoned")
            .push_back(order_id);
        self.volume.fetch_add(open_quantity, Ordering::AcqRel);
    }

    /// Removes and returns the front order id, subtracting `open_quantity`
    /// from volume.
    pub fn pop_front(&self, open_quantity: u64) -> Result<u64, OrderBookError> {
        let mut q = self.queue.lock().expect("level queue mutex poisoned");
        let id = q.pop_front().ok_or(OrderBookError::EmptyLevel {
            price: self.key_price,
        })?;
        drop(q);
        self.volume.fetch_sub(open_quantity, Ordering::AcqRel);
        Ok(id)
    }

    /// Removes and returns the back order id, subtracting `open_quantity`
    /// from volume.
    pub fn pop_back(&self, open_quantity: u64) -> Result<u64, OrderBookError> {
        let mut q = self.queue.lock().expect("level queue mutex poisoned");
        let id = q.pop_back().ok_or(OrderBookError::EmptyLevel {
            price: self.key_price,
        })?;
        drop(q);
        self.volume.fetch_sub(open_quantity, Ordering::AcqRel);
        Ok(id)
    }

    /// Linear scan for `order_id`; removes it and subtracts `open_quantity`
    /// from volume. Errors if not present.
    pub fn delete_order(&self, order_id: u64, open_quantity: u64) -> Result<(), OrderBookError> {
        let mut q = self.queue.lock().expect("level queue mutex poisoned");
        let pos = q
            .iter()
            .position(|&id| id == order_id)
            .ok_or(OrderBookError::OrderNotFound { order_id })?;
        q.remove(pos);
        drop(q);
        self.volume.fetch_sub(open_quantity, Ordering::AcqRel);
        Ok(())
    }

    /// Subtracts `n` from volume directly, used when an order resting in
    /// this level is partially executed or partially cancelled without
    /// leaving the queue.
    pub fn reduce_volume(&self, n: u64) -> Result<(), OrderBookError> {
        let current = self.volume.load(Ordering::Acquire);
        if n > current {
            return Err(OrderBookError::InvariantViolation(format!(
                "reduce_volume: {n} exceeds level volume {current} at price {}",
                self.key_price
            )));
        }
        self.volume.fetch_sub(n, Ordering::AcqRel);
        Ok(())
    }

    /// Removes `order_id` from the queue without touching volume — for
    /// callers that have already accounted for the removed order's
    /// quantity via `reduce_volume`.
    pub fn remove_queued(&self, order_id: u64) {
        let mut q = self.queue.lock().expect("level queue mutex poisoned");
        if let Some(pos) = q.iter().position(|&id| id == order_id) {
            q.remove(pos);
        }
    }

    /// A snapshot copy of the order ids currently queued, oldest first.
    #[must_use]
    pub fn order_ids(&self) -> Vec<u64> {
        self.queue
            .lock()
            .expect("level queue mutex poisoned")
            .iter()
            .copied()
            .collect()
    }

    /// Number of orders currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().expect("level queue mutex poisoned").len()
    }

    /// Alias for `!empty()`, to satisfy clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty()
    }
}
