/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! The matching loop and `canMatch`, spec §4.4 "Matching"/"canMatch".
//!
//! Grounded on `original_source/internal/orderbook/orderbook.go`'s `Match`
//! and the teacher crate's `matching.rs` restart-on-structural-change
//! pattern — generalized here to restart the opposite side's cursor inside
//! the loop body on *both* the bid-incoming and ask-incoming branches. The
//! original only did this for the ask-incoming branch; spec §9's first open
//! question calls for the symmetric fix, which falls out naturally from
//! re-querying the map's best entry on every iteration instead of holding a
//! stale cursor.

use crate::book::book::OrderBook;
use crate::book::order::{MapKind, Order, Side};
use crate::book::trade::{MatchResult, Transaction};
use std::sync::atomic::Ordering;

impl OrderBook {
    /// Matches `incoming` against the opposite side of the book, executing
    /// at the resting order's price until the incoming order is filled or
    /// no more resting orders cross.
    pub(crate) fn match_incoming(&self, incoming: &mut Order) -> MatchResult {
        let mut result = MatchResult::new(incoming.id, incoming.open_quantity);

        loop {
            if incoming.is_filled() {
                break;
            }

            let opposite_kind = match incoming.side {
                Side::Ask => MapKind::Bid,
                Side::Bid => MapKind::Ask,
            };
            let opposite_map = self.level_map(opposite_kind);

            // Restart: always re-query the best entry fresh, never hold a
            // cursor across a mutation. This is what makes the fix for
            // both sides symmetric.
            let best = match incoming.side {
                Side::Ask => opposite_map.last(),
                Side::Bid => opposite_map.first(),
            };
            let Some((level_price, level)) = best else {
                break;
            };

            let crosses = match incoming.side {
                Side::Ask => level_price >= incoming.effective_price(),
                Side::Bid => level_price <= incoming.effective_price(),
            };
            if !crosses {
                break;
            }

            let Some(resting_id) = level.front() else {
                // Defensive: an empty level should never be indexed; drop
                // it and restart.
                opposite_map.delete(level_price);
                continue;
            };

            let trade_qty;
            let trade_price = level_price;
            let resting_filled;
            {
                let mut entry = match self.orders.get_mut(&resting_id) {
                    Some(e) => e,
                    None => {
                        // Defensive: the level referenced an id no longer
                        // in the index. Drop the stale reference and retry.
                        level.delete_order(resting_id, 0).ok();
                        continue;
                    }
                };
                let resting = entry.value_mut();
                trade_qty = incoming.open_quantity.min(resting.open_quantity);
                resting.execute(trade_qty, trade_price);
                incoming.execute(trade_qty, trade_price);
                resting_filled = resting.is_filled();
            }

            level
                .reduce_volume(trade_qty)
                .expect("matching: level volume underflow");
            self.last_executed_price.store(trade_price, Ordering::Release);

            let txn = Transaction {
                taker_order_id: incoming.id,
                maker_order_id: resting_id,
                taker_side: incoming.side,
                price: trade_price,
                quantity: trade_qty,
            };
            self.notify_trade(&txn);
            result.transactions.push(txn);
            result.remaining_quantity = incoming.open_quantity;

            if resting_filled {
                level.remove_queued(resting_id);
                self.orders.remove(&resting_id);
                if level.empty() {
                    opposite_map.delete(level_price);
                }
            }
        }

        result
    }

    /// Walks the opposite side from the best price, accumulating available
    /// volume at crossing prices, to decide whether `order`'s full open
    /// quantity is coverable without mutating anything.
    pub(crate) fn can_match(&self, order: &Order) -> bool {
        let mut remaining = order.open_quantity;
        match order.side {
            Side::Ask => {
                for (price, level) in self.bid_levels.iter_descending() {
                    if price < order.effective_price() {
                        break;
                    }
                    remaining = remaining.saturating_sub(level.volume());
                    if remaining == 0 {
                        break;
                    }
                }
            }
            Side::Bid => {
                for (price, level) in self.ask_levels.iter_ascending() {
                    if price > order.effective_price() {
                        break;
                    }
                    remaining = remaining.saturating_sub(level.volume());
                    if remaining == 0 {
                        break;
                    }
                }
            }
        }
        remaining == 0
    }
}
