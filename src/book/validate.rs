/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Post-command invariant validation, spec §4.4 "Invariant validation"/§8.
//!
//! A failure here is, per spec §4.5, a fatal bug: the caller aborts the
//! engine rather than attempting recovery. There is no single teacher file
//! this is grounded on directly (the distilled spec is the authority here);
//! style follows the validation-style helper methods in the teacher's own
//! `book.rs`.

use crate::book::book::OrderBook;
use crate::book::error::OrderBookError;
use crate::book::order::{MapKind, OrderType, Side};

const ALL_KINDS: [MapKind; 6] = [
    MapKind::Bid,
    MapKind::Ask,
    MapKind::StopBid,
    MapKind::StopAsk,
    MapKind::TrailingStopBid,
    MapKind::TrailingStopAsk,
];

impl OrderBook {
    /// Walks every non-empty level in every map and checks the invariants
    /// spec §4.4/§8 name. Returns the first violation found.
    pub(crate) fn validate_orderbook(&self) -> Result<(), OrderBookError> {
        for kind in ALL_KINDS {
            self.validate_map(kind)?;
        }
        self.validate_book_crossing()?;
        Ok(())
    }

    fn validate_map(&self, kind: MapKind) -> Result<(), OrderBookError> {
        for (key_price, level) in self.level_map(kind).iter_ascending() {
            if level.empty() {
                return Err(bug(format!(
                    "{kind:?}: level at {key_price} is indexed but empty"
                )));
            }
            if level.key_price != key_price {
                return Err(bug(format!(
                    "{kind:?}: level key_price {} does not match map key {key_price}",
                    level.key_price
                )));
            }
            if level.side != kind.side() {
                return Err(bug(format!(
                    "{kind:?}: level side {:?} does not match map side {:?}",
                    level.side,
                    kind.side()
                )));
            }

            let mut summed_volume: u64 = 0;
            for order_id in level.order_ids() {
                let order = self.orders.get(&order_id).ok_or_else(|| {
                    bug(format!(
                        "{kind:?}: level at {key_price} references unknown order {order_id}"
                    ))
                })?;

                if order.is_filled() {
                    return Err(bug(format!(
                        "{kind:?}: filled order {order_id} still indexed at {key_price}"
                    )));
                }
                if order.is_market() {
                    return Err(bug(format!(
                        "{kind:?}: market order {order_id} resting at {key_price}"
                    )));
                }
                if order.symbol_id != self.symbol_id {
                    return Err(bug(format!(
                        "{kind:?}: order {order_id} symbol mismatch"
                    )));
                }
                if order.side != kind.side() {
                    return Err(bug(format!(
                        "{kind:?}: order {order_id} side mismatch"
                    )));
                }
                let expected_key = if kind.is_stop_kind() {
                    order.stop_price
                } else {
                    order.price
                };
                if expected_key != key_price {
                    return Err(bug(format!(
                        "{kind:?}: order {order_id} key price {expected_key} does not match level {key_price}"
                    )));
                }
                if !type_matches_kind(kind, order.order_type) {
                    return Err(bug(format!(
                        "{kind:?}: order {order_id} of type {:?} does not belong in this map",
                        order.order_type
                    )));
                }

                summed_volume += order.open_quantity;
            }

            if summed_volume != level.volume() {
                return Err(bug(format!(
                    "{kind:?}: level at {key_price} volume {} != summed open quantity {summed_volume}",
                    level.volume()
                )));
            }

            if kind.is_stop_kind() {
                let market_ref = match kind.side() {
                    Side::Bid => self.last_executed_price_ask(),
                    Side::Ask => self.last_executed_price_bid(),
                };
                let would_activate = match kind.side() {
                    Side::Bid => key_price <= market_ref,
                    Side::Ask => key_price >= market_ref,
                };
                if would_activate {
                    return Err(bug(format!(
                        "{kind:?}: resting stop at {key_price} already satisfies activation against {market_ref}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_book_crossing(&self) -> Result<(), OrderBookError> {
        let bid = self.best_bid();
        let ask = self.best_ask();
        let bid_present = !self.bid_levels.empty();
        let ask_present = !self.ask_levels.empty();
        if bid_present && ask_present && bid >= ask {
            return Err(bug(format!(
                "crossed book at rest: bestBid={bid} >= bestAsk={ask}"
            )));
        }
        Ok(())
    }
}

fn type_matches_kind(kind: MapKind, order_type: OrderType) -> bool {
    match kind {
        MapKind::Bid | MapKind::Ask => order_type == OrderType::Limit,
        MapKind::StopBid | MapKind::StopAsk => {
            matches!(order_type, OrderType::Stop | OrderType::StopLimit)
        }
        MapKind::TrailingStopBid | MapKind::TrailingStopAsk => matches!(
            order_type,
            OrderType::TrailingStop | OrderType::TrailingStopLimit
        ),
    }
}

fn bug(message: String) -> OrderBookError {
    OrderBookError::InvariantViolation(message)
}
