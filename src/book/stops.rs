/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Stop/trailing-stop activation state machine and trailing-price
//! recomputation, spec §4.4 "Stop activation state machine"/"Trailing
//! pricing".
//!
//! Grounded on `original_source/internal/orderbook/orderbook.go`'s
//! `ActivateStopOrders`/`ActivateBidStopOrders`/`ActivateAskStopOrders`/
//! `UpdateBidStopOrders`/`UpdateAskStopOrders`/`CalculateStopPrice`, with
//! spec §9's second and third open questions fixed:
//!
//! - Stop/trailing-stop insertion keys into the map matching the order's
//!   own side, never the opposite side's map.
//! - `update_ask_stop_orders` reads emptiness from, and rebuilds into, the
//!   ask trailing-stop map — not the bid one.

use crate::book::book::OrderBook;
use crate::book::order::{MapKind, Order, PRICE_MAX, Side};
use std::sync::Arc;
use std::sync::atomic::Ordering;

/// Defensive bound on the stop-activation fixed-point loop (spec §9).
const MAX_ACTIVATION_PASSES: u32 = 10_000;

impl OrderBook {
    /// Repeats bid/ask stop and trailing-stop activation passes, with
    /// trailing recomputation interleaved, until a full pass activates
    /// nothing.
    pub(crate) fn activate_stop_orders(&self) {
        let mut passes = 0u32;
        loop {
            let mut activated = self.activate_bid_stop_orders();
            self.update_ask_stop_orders();
            activated |= self.activate_ask_stop_orders();
            self.update_bid_stop_orders();

            passes += 1;
            assert!(
                passes < MAX_ACTIVATION_PASSES,
                "activate_stop_orders: exceeded {MAX_ACTIVATION_PASSES} fixed-point passes"
            );
            if !activated {
                break;
            }
        }
    }

    fn activate_bid_stop_orders(&self) -> bool {
        let mut any = self.drain_activatable(MapKind::StopBid);
        any |= self.drain_activatable(MapKind::TrailingStopBid);
        any
    }

    fn activate_ask_stop_orders(&self) -> bool {
        let mut any = self.drain_activatable(MapKind::StopAsk);
        any |= self.drain_activatable(MapKind::TrailingStopAsk);
        any
    }

    /// Repeatedly activates the best-positioned order in `kind`'s map while
    /// it satisfies the activation condition, restarting after each one.
    fn drain_activatable(&self, kind: MapKind) -> bool {
        let mut any = false;
        loop {
            let map = self.level_map(kind);
            let candidate = match kind.side() {
                Side::Bid => map.first(),
                Side::Ask => map.last(),
            };
            let Some((price, level)) = candidate else {
                break;
            };
            let activates = match kind.side() {
                Side::Bid => price <= self.last_executed_price_ask(),
                Side::Ask => price >= self.last_executed_price_bid(),
            };
            if !activates {
                break;
            }
            let Some(order_id) = level.front() else {
                map.delete(price);
                continue;
            };
            self.activate_one(kind, price, &level, order_id);
            any = true;
        }
        any
    }

    fn activate_one(&self, kind: MapKind, price: u64, level: &Arc<crate::book::level::Level>, order_id: u64) {
        let (_, mut order) = self
            .orders
            .remove(&order_id)
            .expect("activate_one: order missing from index");
        level.remove_queued(order_id);
        level
            .reduce_volume(order.open_quantity)
            .expect("activate_one: level volume underflow");
        if level.empty() {
            self.level_map(kind).delete(price);
        }
        order.resting_at = None;
        order.convert_on_activation();
        // Re-enter the primary mutation phase only; the outer fixed-point
        // loop (not this recursive call) owns repeating activation passes.
        let _ = self.add_order_inner(order);
    }

    /// `stopPrice` for a trailing order, per spec §4.4 "Trailing pricing".
    pub(crate) fn calculate_stop_price(&self, order: &Order) -> u64 {
        match order.side {
            Side::Ask => self
                .last_executed_price_bid()
                .saturating_sub(order.trailing_amount),
            Side::Bid => self
                .last_executed_price_ask()
                .saturating_add(order.trailing_amount)
                .min(PRICE_MAX),
        }
    }

    fn update_bid_stop_orders(&self) {
        let reference_ok = self.trailing_ask_price.load(Ordering::Acquire)
            <= self.last_executed_price_ask();
        if reference_ok || self.trailing_stop_bid_levels.empty() {
            self.trailing_ask_price
                .store(self.last_executed_price_raw(), Ordering::Release);
            return;
        }
        self.rebuild_trailing_map(MapKind::TrailingStopBid);
        self.trailing_ask_price
            .store(self.last_executed_price_raw(), Ordering::Release);
    }

    fn update_ask_stop_orders(&self) {
        let reference_ok = self.trailing_bid_price.load(Ordering::Acquire)
            <= self.last_executed_price_bid();
        if reference_ok || self.trailing_stop_ask_levels.empty() {
            self.trailing_bid_price
                .store(self.last_executed_price_raw(), Ordering::Release);
            return;
        }
        self.rebuild_trailing_map(MapKind::TrailingStopAsk);
        self.trailing_bid_price
            .store(self.last_executed_price_raw(), Ordering::Release);
    }

    /// Drains every order out of `kind`'s current trailing map, recomputes
    /// each one's stopPrice against the latest market reference, and
    /// reinserts it into a freshly built map, which replaces the old one.
    fn rebuild_trailing_map(&self, kind: MapKind) {
        let old_map = self.level_map(kind);
        let old_entries: Vec<_> = old_map.iter_ascending().collect();
        let staging = crate::book::level_map::LevelMap::new();

        for (_, level) in old_entries {
            for order_id in level.order_ids() {
                let mut order = match self.orders.get_mut(&order_id) {
                    Some(o) => o,
                    None => continue,
                };
                let new_price = self.calculate_stop_price(&order);
                order.stop_price = new_price;
                order.resting_at = Some(crate::book::order::RestingAt {
                    kind,
                    key_price: new_price,
                });
                let side = order.side;
                let symbol_id = order.symbol_id;
                let open_qty = order.open_quantity;
                drop(order);
                let new_level = staging.emplace_with_hint(new_price, side, kind, symbol_id, None);
                new_level.add_order(order_id, open_qty);
            }
        }

        let new_entries: Vec<_> = staging.iter_ascending().collect();
        old_map.replace_all(new_entries);
    }
}
