/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! The Order value type: side, type, time-in-force, and the execution
//! lifecycle counters described in spec §3/§4.1.

use crate::book::error::OrderBookError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved sentinel used for "no price"/market-crossing comparisons.
pub const PRICE_MAX: u64 = u64::MAX;

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// A buy order.
    Bid,
    /// A sell order.
    Ask,
}

impl Side {
    /// The opposite side.
    #[must_use]
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// The six order types spec §3 names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Rests at a fixed price until filled or cancelled.
    Limit,
    /// Executes immediately against the best available price; never rests.
    Market,
    /// Converts to Market once the market-reference price crosses stopPrice.
    Stop,
    /// Converts to Limit once the market-reference price crosses stopPrice.
    StopLimit,
    /// Like Stop, but stopPrice recomputes as the market moves favorably.
    TrailingStop,
    /// Like StopLimit, but stopPrice recomputes as the market moves favorably.
    TrailingStopLimit,
}

impl OrderType {
    fn is_trailing(self) -> bool {
        matches!(self, OrderType::TrailingStop | OrderType::TrailingStopLimit)
    }

    fn is_stop_family(self) -> bool {
        matches!(
            self,
            OrderType::Stop
                | OrderType::StopLimit
                | OrderType::TrailingStop
                | OrderType::TrailingStopLimit
        )
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderType::Limit => "limit",
            OrderType::Market => "market",
            OrderType::Stop => "stop",
            OrderType::StopLimit => "stop-limit",
            OrderType::TrailingStop => "trailing-stop",
            OrderType::TrailingStopLimit => "trailing-stop-limit",
        };
        write!(f, "{s}")
    }
}

/// Time-in-force, restricted per spec §3 to the three classic variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Rests until explicitly cancelled or fully filled.
    GoodTillCancel,
    /// Fill whatever is possible immediately; cancel the remainder.
    ImmediateOrCancel,
    /// Fill fully and immediately, or reject with no state change.
    FillOrKill,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TimeInForce::GoodTillCancel => "GTC",
            TimeInForce::ImmediateOrCancel => "IOC",
            TimeInForce::FillOrKill => "FOK",
        };
        write!(f, "{s}")
    }
}

/// Which of the six `LevelMap`s a resting order's level lives in.
///
/// Serves as the stable, pointer-free "level id" recommended in spec §9:
/// together with the level's `keyPrice` it identifies a level without an
/// owning reference cycle between `Order` and `Level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    /// `bidLevels`.
    Bid,
    /// `askLevels`.
    Ask,
    /// `stopBidLevels`.
    StopBid,
    /// `stopAskLevels`.
    StopAsk,
    /// `trailingStopBidLevels`.
    TrailingStopBid,
    /// `trailingStopAskLevels`.
    TrailingStopAsk,
}

impl MapKind {
    /// The side this map kind is associated with.
    #[must_use]
    pub fn side(self) -> Side {
        match self {
            MapKind::Bid | MapKind::StopBid | MapKind::TrailingStopBid => Side::Bid,
            MapKind::Ask | MapKind::StopAsk | MapKind::TrailingStopAsk => Side::Ask,
        }
    }

    /// Whether this map kind holds stop/trailing-stop levels (keyed by
    /// stopPrice) as opposed to limit levels (keyed by price).
    #[must_use]
    pub fn is_stop_kind(self) -> bool {
        !matches!(self, MapKind::Bid | MapKind::Ask)
    }
}

/// A stable back-reference from a resting `Order` to the `Level` currently
/// holding it: the map it lives in plus that level's key price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestingAt {
    /// Which `LevelMap` the level lives in.
    pub kind: MapKind,
    /// The level's key price (order.price for limit levels, order.stopPrice
    /// for stop/trailing-stop levels).
    pub key_price: u64,
}

/// A single order and its execution lifecycle, per spec §3/§4.1.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique within a book.
    pub id: u64,
    /// The symbol this order belongs to.
    pub symbol_id: u64,
    /// Which side of the book this order is on.
    pub side: Side,
    /// The order's type.
    pub order_type: OrderType,
    /// Time-in-force.
    pub tif: TimeInForce,
    /// Limit price. Meaningless for Market orders (see `effective_price`).
    pub price: u64,
    /// Activation threshold for Stop/StopLimit/TrailingStop/TrailingStopLimit.
    /// Zero once the order has converted to Market/Limit.
    pub stop_price: u64,
    /// Trailing distance for TrailingStop/TrailingStopLimit. Zero once
    /// converted.
    pub trailing_amount: u64,
    /// Quantity at construction time.
    pub original_quantity: u64,
    /// Quantity executed so far.
    pub executed_quantity: u64,
    /// Quantity still open (`original - executed`).
    pub open_quantity: u64,
    /// Price of this order's most recent execution, if any.
    pub last_executed_price: u64,
    /// Quantity of this order's most recent execution, if any.
    pub last_executed_quantity: u64,
    /// Where this order currently rests, if it does.
    pub resting_at: Option<RestingAt>,
}

impl Order {
    /// Constructs a new order of the given type/side, validating the
    /// type/TIF compatibility rule from spec §3.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        symbol_id: u64,
        side: Side,
        order_type: OrderType,
        tif: TimeInForce,
        price: u64,
        stop_price: u64,
        trailing_amount: u64,
        quantity: u64,
    ) -> Result<Self, OrderBookError> {
        if quantity == 0 {
            return Err(OrderBookError::ZeroQuantity { order_id: id });
        }
        validate_tif(order_type, tif, id)?;

        Ok(Self {
            id,
            symbol_id,
            side,
            order_type,
            tif,
            price,
            stop_price,
            trailing_amount,
            original_quantity: quantity,
            executed_quantity: 0,
            open_quantity: quantity,
            last_executed_price: 0,
            last_executed_quantity: 0,
            resting_at: None,
        })
    }

    /// The price the matching loop should compare against: for Market
    /// orders this is the side's crossing sentinel, not `self.price`.
    #[must_use]
    pub fn effective_price(&self) -> u64 {
        match self.order_type {
            OrderType::Market => match self.side {
                Side::Bid => PRICE_MAX,
                Side::Ask => 0,
            },
            _ => self.price,
        }
    }

    /// Executes `qty` of this order at `price`: decrements `open_quantity`,
    /// increments `executed_quantity`, records the last fill.
    ///
    /// # Panics
    /// Panics if `qty` exceeds `open_quantity` — the matching loop must
    /// never request more than an order has open.
    pub fn execute(&mut self, qty: u64, price: u64) {
        assert!(
            qty <= self.open_quantity,
            "executeOrder: qty {qty} exceeds open quantity {}",
            self.open_quantity
        );
        self.open_quantity -= qty;
        self.executed_quantity += qty;
        self.last_executed_price = price;
        self.last_executed_quantity = qty;
    }

    /// Reduces `open_quantity` by `min(qty, open_quantity)`, used by
    /// partial Cancel.
    pub fn reduce_quantity(&mut self, qty: u64) {
        self.open_quantity = self.open_quantity.saturating_sub(qty);
    }

    /// `open_quantity == 0`.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.open_quantity == 0
    }

    /// True for Ask-side orders.
    #[must_use]
    pub fn is_ask(&self) -> bool {
        self.side == Side::Ask
    }

    /// True for Bid-side orders.
    #[must_use]
    pub fn is_bid(&self) -> bool {
        self.side == Side::Bid
    }

    /// True for Market orders.
    #[must_use]
    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::Market
    }

    /// True for Limit orders.
    #[must_use]
    pub fn is_limit(&self) -> bool {
        self.order_type == OrderType::Limit
    }

    /// True for Stop orders (not StopLimit).
    #[must_use]
    pub fn is_stop(&self) -> bool {
        self.order_type == OrderType::Stop
    }

    /// True for StopLimit orders.
    #[must_use]
    pub fn is_stop_limit(&self) -> bool {
        self.order_type == OrderType::StopLimit
    }

    /// True for TrailingStop orders.
    #[must_use]
    pub fn is_trailing_stop(&self) -> bool {
        self.order_type == OrderType::TrailingStop
    }

    /// True for TrailingStopLimit orders.
    #[must_use]
    pub fn is_trailing_stop_limit(&self) -> bool {
        self.order_type == OrderType::TrailingStopLimit
    }

    /// True for any of the four stop/trailing-stop variants.
    #[must_use]
    pub fn is_stop_family(&self) -> bool {
        self.order_type.is_stop_family()
    }

    /// True for TrailingStop/TrailingStopLimit.
    #[must_use]
    pub fn is_trailing(&self) -> bool {
        self.order_type.is_trailing()
    }

    /// GTC time-in-force.
    #[must_use]
    pub fn is_gtc(&self) -> bool {
        self.tif == TimeInForce::GoodTillCancel
    }

    /// IOC time-in-force.
    #[must_use]
    pub fn is_ioc(&self) -> bool {
        self.tif == TimeInForce::ImmediateOrCancel
    }

    /// FOK time-in-force.
    #[must_use]
    pub fn is_fok(&self) -> bool {
        self.tif == TimeInForce::FillOrKill
    }

    /// Converts an activated Stop order to a Market order in place
    /// (clearing stopPrice/trailingAmount), or a StopLimit/TrailingStopLimit
    /// order to a Limit order. Called by `activate_stop_orders`.
    pub fn convert_on_activation(&mut self) {
        self.order_type = match self.order_type {
            OrderType::Stop | OrderType::TrailingStop => OrderType::Market,
            OrderType::StopLimit | OrderType::TrailingStopLimit => OrderType::Limit,
            other => other,
        };
        self.stop_price = 0;
        self.trailing_amount = 0;
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order#{} [{} {} {} price={} open={}/{}]",
            self.id,
            self.side,
            self.order_type,
            self.tif,
            self.price,
            self.open_quantity,
            self.original_quantity
        )
    }
}

/// Market and Stop/TrailingStop forbid GTC; Stop/TrailingStop forbid FOK.
fn validate_tif(
    order_type: OrderType,
    tif: TimeInForce,
    order_id: u64,
) -> Result<(), OrderBookError> {
    let forbids_gtc = matches!(
        order_type,
        OrderType::Market | OrderType::Stop | OrderType::TrailingStop
    );
    if forbids_gtc && tif == TimeInForce::GoodTillCancel {
        return Err(OrderBookError::IncompatibleTimeInForce {
            order_id,
            order_type,
            tif,
        });
    }
    let forbids_fok = matches!(order_type, OrderType::Stop | OrderType::TrailingStop);
    if forbids_fok && tif == TimeInForce::FillOrKill {
        return Err(OrderBookError::IncompatibleTimeInForce {
            order_id,
            order_type,
            tif,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(id: u64, side: Side, price: u64, qty: u64) -> Order {
        Order::new(
            id,
            0,
            side,
            OrderType::Limit,
            TimeInForce::GoodTillCancel,
            price,
            0,
            0,
            qty,
        )
        .unwrap()
    }

    #[test]
    fn execute_updates_counters() {
        let mut o = limit(1, Side::Bid, 100, 10);
        o.execute(4, 100);
        assert_eq!(o.open_quantity, 6);
        assert_eq!(o.executed_quantity, 4);
        assert_eq!(o.last_executed_price, 100);
        assert_eq!(o.last_executed_quantity, 4);
        assert!(!o.is_filled());
        o.execute(6, 100);
        assert!(o.is_filled());
    }

    #[test]
    #[should_panic(expected = "exceeds open quantity")]
    fn execute_more_than_open_panics() {
        let mut o = limit(1, Side::Bid, 100, 10);
        o.execute(11, 100);
    }

    #[test]
    fn reduce_quantity_saturates() {
        let mut o = limit(1, Side::Bid, 100, 10);
        o.reduce_quantity(50);
        assert_eq!(o.open_quantity, 0);
        assert!(o.is_filled());
    }

    #[test]
    fn market_order_forbids_gtc() {
        let err = Order::new(
            1,
            0,
            Side::Ask,
            OrderType::Market,
            TimeInForce::GoodTillCancel,
            0,
            0,
            0,
            10,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OrderBookError::IncompatibleTimeInForce { .. }
        ));
    }

    #[test]
    fn stop_forbids_fok() {
        let err = Order::new(
            1,
            0,
            Side::Bid,
            OrderType::Stop,
            TimeInForce::FillOrKill,
            0,
            50,
            0,
            10,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            OrderBookError::IncompatibleTimeInForce { .. }
        ));
    }

    #[test]
    fn stop_limit_accepts_all_tifs() {
        for tif in [
            TimeInForce::GoodTillCancel,
            TimeInForce::ImmediateOrCancel,
            TimeInForce::FillOrKill,
        ] {
            Order::new(1, 0, Side::Bid, OrderType::StopLimit, tif, 100, 90, 0, 10).unwrap();
        }
    }

    #[test]
    fn zero_quantity_rejected() {
        let err = Order::new(
            1,
            0,
            Side::Bid,
            OrderType::Limit,
            TimeInForce::GoodTillCancel,
            100,
            0,
            0,
            0,
        )
        .unwrap_err();
        assert!(matches!(err, OrderBookError::ZeroQuantity { .. }));
    }

    #[test]
    fn convert_on_activation_clears_stop_fields() {
        let mut o = Order::new(
            1,
            0,
            Side::Bid,
            OrderType::Stop,
            TimeInForce::ImmediateOrCancel,
            0,
            90,
            0,
            10,
        )
        .unwrap();
        o.convert_on_activation();
        assert_eq!(o.order_type, OrderType::Market);
        assert_eq!(o.stop_price, 0);
    }
}
