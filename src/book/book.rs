/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! `OrderBook`: the engine. Owns six `LevelMap`s plus an id→order index and
//! implements the command dispatcher from spec §4.4.
//!
//! Grounded on `original_source/internal/orderbook/orderbook.go` for
//! semantics and the teacher crate's `book.rs` for struct shape (a
//! `DashMap` id index alongside `crossbeam_skiplist::SkipMap` price
//! ladders, `AtomicCell`/atomics for the scalar market-reference prices).

use crate::book::error::OrderBookError;
use crate::book::level_map::LevelMap;
use crate::book::order::{MapKind, Order, OrderType, PRICE_MAX, RestingAt, Side};
use crate::book::trade::{MatchResult, TradeListener, Transaction};
use dashmap::DashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

/// The per-symbol limit order book: six price-ordered level maps, an id
/// index, and the scalar market-reference prices the stop/trailing-stop
/// machinery reads.
///
/// All mutating methods take `&self`: spec §5's "per-symbol single-writer"
/// model means exactly one command is ever in flight at a time, but the
/// book itself stays a plain shared value (no external mutex) by relying on
/// `DashMap`/`SkipMap`'s own interior concurrency, the same shape the
/// teacher crate uses for its id index and price ladders.
pub struct OrderBook {
    /// The symbol this book belongs to.
    pub symbol_id: u64,
    pub(crate) last_executed_price: AtomicU64,
    pub(crate) trailing_bid_price: AtomicU64,
    pub(crate) trailing_ask_price: AtomicU64,
    pub(crate) orders: DashMap<u64, Order>,
    pub(crate) bid_levels: LevelMap,
    pub(crate) ask_levels: LevelMap,
    pub(crate) stop_bid_levels: LevelMap,
    pub(crate) stop_ask_levels: LevelMap,
    pub(crate) trailing_stop_bid_levels: LevelMap,
    pub(crate) trailing_stop_ask_levels: LevelMap,
    trade_listener: RwLock<Option<TradeListener>>,
}

impl OrderBook {
    /// A fresh, empty book for `symbol_id`.
    #[must_use]
    pub fn new(symbol_id: u64) -> Self {
        Self {
            symbol_id,
            last_executed_price: AtomicU64::new(0),
            trailing_bid_price: AtomicU64::new(0),
            trailing_ask_price: AtomicU64::new(0),
            orders: DashMap::new(),
            bid_levels: LevelMap::new(),
            ask_levels: LevelMap::new(),
            stop_bid_levels: LevelMap::new(),
            stop_ask_levels: LevelMap::new(),
            trailing_stop_bid_levels: LevelMap::new(),
            trailing_stop_ask_levels: LevelMap::new(),
            trade_listener: RwLock::new(None),
        }
    }

    /// Registers a callback invoked with every `Transaction` the engine
    /// produces, including ones generated internally by stop activation.
    pub fn set_trade_listener(&self, listener: TradeListener) {
        *self.trade_listener.write().expect("trade listener lock poisoned") = Some(listener);
    }

    pub(crate) fn notify_trade(&self, txn: &Transaction) {
        if let Some(listener) = self
            .trade_listener
            .read()
            .expect("trade listener lock poisoned")
            .as_ref()
        {
            listener(txn);
        }
    }

    pub(crate) fn level_map(&self, kind: MapKind) -> &LevelMap {
        match kind {
            MapKind::Bid => &self.bid_levels,
            MapKind::Ask => &self.ask_levels,
            MapKind::StopBid => &self.stop_bid_levels,
            MapKind::StopAsk => &self.stop_ask_levels,
            MapKind::TrailingStopBid => &self.trailing_stop_bid_levels,
            MapKind::TrailingStopAsk => &self.trailing_stop_ask_levels,
        }
    }

    /// Raw `lastExecutedPrice`, 0 meaning "no trades yet".
    #[must_use]
    pub fn last_executed_price_raw(&self) -> u64 {
        self.last_executed_price.load(Ordering::Acquire)
    }

    /// The market reference a bid-stop compares against: raw
    /// `lastExecutedPrice` biased to `PRICE_MAX` when no trades have
    /// occurred, so a bid-stop never activates spuriously pre-trade.
    #[must_use]
    pub fn last_executed_price_ask(&self) -> u64 {
        let raw = self.last_executed_price_raw();
        if raw == 0 { PRICE_MAX } else { raw }
    }

    /// The market reference an ask-stop compares against: raw
    /// `lastExecutedPrice` (0 if none).
    #[must_use]
    pub fn last_executed_price_bid(&self) -> u64 {
        self.last_executed_price_raw()
    }

    /// Highest resting bid price, or 0 if the bid side is empty.
    #[must_use]
    pub fn best_bid(&self) -> u64 {
        self.bid_levels.last().map(|(p, _)| p).unwrap_or(0)
    }

    /// Lowest resting ask price, or `PRICE_MAX` if the ask side is empty.
    #[must_use]
    pub fn best_ask(&self) -> u64 {
        self.ask_levels.first().map(|(p, _)| p).unwrap_or(PRICE_MAX)
    }

    /// Spread between best ask and best bid; meaningless (and not checked)
    /// when either side is empty.
    #[must_use]
    pub fn spread(&self) -> Option<u64> {
        let bid = self.best_bid();
        let ask = self.best_ask();
        if bid == 0 || ask == PRICE_MAX {
            None
        } else {
            ask.checked_sub(bid)
        }
    }

    /// Number of orders currently held in the id index (resting or
    /// conditional).
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// A copy of the order with `id`, if present.
    #[must_use]
    pub fn get_order(&self, id: u64) -> Option<Order> {
        self.orders.get(&id).map(|e| e.value().clone())
    }

    // ---- Command dispatcher -------------------------------------------
    //
    // Every public command method runs the three phases spec §4.4 names:
    // (1) primary mutation, (2) activateStopOrders fixed point, (3)
    // validateOrderbook. Internal recursive re-entry (stop activation,
    // Replace's synthesized AddOrder) goes through `add_order_inner`
    // directly so phases 2/3 run exactly once per externally-issued
    // command, not once per internal recursive step.

    /// `AddOrder`: validates, matches, and rests (or discards) `order`.
    pub fn add_order(&self, order: Order) -> Result<MatchResult, OrderBookError> {
        trace!(order_id = order.id, side = %order.side, kind = %order.order_type, "add_order");
        let result = self.add_order_inner(order)?;
        self.activate_stop_orders();
        self.validate_orderbook()
            .unwrap_or_else(|e| panic!("post-command invariant violation: {e}"));
        Ok(result)
    }

    pub(crate) fn add_order_inner(&self, mut order: Order) -> Result<MatchResult, OrderBookError> {
        if self.orders.contains_key(&order.id) {
            return Err(OrderBookError::DuplicateOrderId { order_id: order.id });
        }

        match order.order_type {
            OrderType::Market => Ok(self.match_incoming(&mut order)),
            OrderType::Limit => self.add_limit_order(order),
            OrderType::Stop
            | OrderType::StopLimit
            | OrderType::TrailingStop
            | OrderType::TrailingStopLimit => self.add_conditional_order(order),
        }
    }

    fn add_limit_order(&self, mut order: Order) -> Result<MatchResult, OrderBookError> {
        if order.is_fok() && !self.can_match(&order) {
            return Err(OrderBookError::FokUnfillable { order_id: order.id });
        }

        let result = self.match_incoming(&mut order);

        if !order.is_filled() && !order.is_ioc() && !order.is_fok() {
            self.rest_limit_order(order);
        }

        Ok(result)
    }

    fn add_conditional_order(&self, mut order: Order) -> Result<MatchResult, OrderBookError> {
        if order.is_trailing() {
            order.stop_price = self.calculate_stop_price(&order);
        }

        let market_ref = match order.side {
            Side::Ask => self.last_executed_price_bid(),
            Side::Bid => self.last_executed_price_ask(),
        };
        let activates = match order.side {
            Side::Ask => market_ref <= order.stop_price,
            Side::Bid => market_ref >= order.stop_price,
        };

        if activates {
            debug!(order_id = order.id, stop_price = order.stop_price, "stop order activates immediately on arrival");
            order.convert_on_activation();
            self.add_order_inner(order)
        } else {
            let id = order.id;
            let qty = order.open_quantity;
            self.rest_conditional_order(order);
            Ok(MatchResult::new(id, qty))
        }
    }

    fn rest_limit_order(&self, mut order: Order) {
        let kind = match order.side {
            Side::Bid => MapKind::Bid,
            Side::Ask => MapKind::Ask,
        };
        let level = self
            .level_map(kind)
            .emplace(order.price, order.side, kind, order.symbol_id);
        level.add_order(order.id, order.open_quantity);
        order.resting_at = Some(RestingAt {
            kind,
            key_price: order.price,
        });
        let id = order.id;
        self.orders.insert(id, order);
    }

    fn rest_conditional_order(&self, mut order: Order) {
        let kind = match (order.side, order.is_trailing()) {
            (Side::Bid, false) => MapKind::StopBid,
            (Side::Ask, false) => MapKind::StopAsk,
            (Side::Bid, true) => MapKind::TrailingStopBid,
            (Side::Ask, true) => MapKind::TrailingStopAsk,
        };
        let level = self
            .level_map(kind)
            .emplace(order.stop_price, order.side, kind, order.symbol_id);
        level.add_order(order.id, order.open_quantity);
        order.resting_at = Some(RestingAt {
            kind,
            key_price: order.stop_price,
        });
        let id = order.id;
        self.orders.insert(id, order);
    }

    /// `DeleteOrder`: full cancel of a resting order.
    pub fn delete_order(&self, order_id: u64) -> Result<(), OrderBookError> {
        self.delete_order_inner(order_id)?;
        self.activate_stop_orders();
        self.validate_orderbook()
            .unwrap_or_else(|e| panic!("post-command invariant violation: {e}"));
        Ok(())
    }

    fn delete_order_inner(&self, order_id: u64) -> Result<(), OrderBookError> {
        let (_, order) = self
            .orders
            .remove(&order_id)
            .ok_or(OrderBookError::OrderNotFound { order_id })?;
        let Some(resting) = order.resting_at else {
            return Err(OrderBookError::InvalidOperation {
                message: format!("order {order_id} is not resting"),
            });
        };
        let level = self
            .level_map(resting.kind)
            .get(resting.key_price)
            .ok_or_else(|| {
                OrderBookError::InvariantViolation(format!(
                    "order {order_id} referenced a level at {} that does not exist",
                    resting.key_price
                ))
            })?;
        level.delete_order(order_id, order.open_quantity)?;
        if level.empty() {
            self.level_map(resting.kind).delete(resting.key_price);
        }
        Ok(())
    }

    /// `CancelOrder`: reduce `order_id`'s open quantity by `qty`; deletes
    /// the order outright if that reaches zero. `qty` must be positive.
    pub fn cancel_order(&self, order_id: u64, qty: u64) -> Result<(), OrderBookError> {
        if qty == 0 {
            return Err(OrderBookError::InvalidQuantity { order_id, quantity: qty });
        }
        let should_delete = {
            let mut entry = self
                .orders
                .get_mut(&order_id)
                .ok_or(OrderBookError::OrderNotFound { order_id })?;
            let order = entry.value_mut();
            let resting = order.resting_at.ok_or_else(|| OrderBookError::InvalidOperation {
                message: format!("order {order_id} is not resting"),
            })?;
            let reduce_by = qty.min(order.open_quantity);
            order.reduce_quantity(qty);
            let level = self.level_map(resting.kind).get(resting.key_price).ok_or_else(|| {
                OrderBookError::InvariantViolation(format!(
                    "order {order_id} referenced a level at {} that does not exist",
                    resting.key_price
                ))
            })?;
            level.reduce_volume(reduce_by)?;
            order.is_filled()
        };
        if should_delete {
            self.delete_order_inner(order_id)?;
        }
        self.activate_stop_orders();
        self.validate_orderbook()
            .unwrap_or_else(|e| panic!("post-command invariant violation: {e}"));
        Ok(())
    }

    /// `ReplaceOrder`: cancel-and-replace, losing time priority. The new
    /// price is interpreted as a new stopPrice for Stop/StopLimit/
    /// TrailingStop/TrailingStopLimit orders, or a new limit price
    /// otherwise.
    pub fn replace_order(
        &self,
        old_order_id: u64,
        new_order_id: u64,
        new_price: u64,
    ) -> Result<MatchResult, OrderBookError> {
        let (_, old) = self
            .orders
            .remove(&old_order_id)
            .ok_or(OrderBookError::OrderNotFound { order_id: old_order_id })?;
        if let Some(resting) = old.resting_at {
            if let Some(level) = self.level_map(resting.kind).get(resting.key_price) {
                level.delete_order(old_order_id, old.open_quantity)?;
                if level.empty() {
                    self.level_map(resting.kind).delete(resting.key_price);
                }
            }
        }

        let mut replacement = old.clone();
        replacement.id = new_order_id;
        replacement.resting_at = None;
        replacement.executed_quantity = 0;
        replacement.open_quantity = replacement.original_quantity;
        if replacement.is_stop_family() {
            replacement.stop_price = new_price;
        } else {
            replacement.price = new_price;
        }

        let result = self.add_order_inner(replacement)?;
        self.activate_stop_orders();
        self.validate_orderbook()
            .unwrap_or_else(|e| panic!("post-command invariant violation: {e}"));
        Ok(result)
    }

    /// `ExecuteOrder`: directly executes `quantity` of a named resting
    /// order, at `price` if given or the order's own price otherwise.
    pub fn execute_order(
        &self,
        order_id: u64,
        quantity: u64,
        price: Option<u64>,
    ) -> Result<(), OrderBookError> {
        if quantity == 0 {
            return Err(OrderBookError::InvalidQuantity { order_id, quantity });
        }
        if let Some(p) = price {
            if p == 0 {
                return Err(OrderBookError::InvalidPrice { order_id });
            }
        }

        let should_delete = {
            let mut entry = self
                .orders
                .get_mut(&order_id)
                .ok_or(OrderBookError::OrderNotFound { order_id })?;
            let order = entry.value_mut();
            if quantity > order.open_quantity {
                return Err(OrderBookError::InvalidQuantity { order_id, quantity });
            }
            let exec_price = price.unwrap_or(order.price);
            let resting = order.resting_at;
            order.execute(quantity, exec_price);
            self.last_executed_price.store(exec_price, Ordering::Release);
            self.notify_trade(&Transaction {
                taker_order_id: order_id,
                maker_order_id: order_id,
                taker_side: order.side,
                price: exec_price,
                quantity,
            });
            if let Some(resting) = resting {
                if let Some(level) = self.level_map(resting.kind).get(resting.key_price) {
                    level.reduce_volume(quantity)?;
                }
            } else {
                warn!(order_id, "execute_order: target order is not resting");
            }
            order.is_filled()
        };

        if should_delete {
            self.delete_order_inner(order_id)?;
        }
        self.activate_stop_orders();
        self.validate_orderbook()
            .unwrap_or_else(|e| panic!("post-command invariant violation: {e}"));
        Ok(())
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("symbol_id", &self.symbol_id)
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("last_executed_price", &self.last_executed_price_raw())
            .field("order_count", &self.order_count())
            .finish()
    }
}
