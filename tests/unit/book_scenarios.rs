//! The six boundary scenarios and the testable laws, taken near-verbatim
//! from the order book's own documented examples, grounded in style on the
//! teacher crate's `tests/unit/book_coverage_tests.rs`.

use venue_orderbook::prelude::*;

fn limit(id: u64, side: Side, price: u64, qty: u64, tif: TimeInForce) -> Order {
    Order::new(id, 0, side, OrderType::Limit, tif, price, 0, 0, qty).unwrap()
}

fn market(id: u64, side: Side, qty: u64) -> Order {
    Order::new(id, 0, side, OrderType::Market, TimeInForce::ImmediateOrCancel, 0, 0, 0, qty)
        .unwrap()
}

fn stop(id: u64, side: Side, stop_price: u64, qty: u64, tif: TimeInForce) -> Order {
    Order::new(id, 0, side, OrderType::Stop, tif, 0, stop_price, 0, qty).unwrap()
}

#[test]
fn scenario_1_resting_orders_on_both_sides() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Ask, 30, 100, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(2, Side::Bid, 10, 50, TimeInForce::GoodTillCancel)).unwrap();

    assert_eq!(book.best_ask(), 30);
    assert_eq!(book.best_bid(), 10);
    assert_eq!(book.last_executed_price_raw(), 0);
}

#[test]
fn scenario_2_crossing_ask_matches_resting_bid() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Ask, 30, 100, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(2, Side::Bid, 10, 50, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(4, Side::Ask, 5, 20, TimeInForce::GoodTillCancel)).unwrap();

    assert_eq!(book.best_bid(), 10);
    assert_eq!(book.best_ask(), 30);
    assert_eq!(book.last_executed_price_raw(), 10);
    assert_eq!(book.get_order(2).unwrap().open_quantity, 30);
}

#[test]
fn scenario_3_ioc_market_takes_best_price_first() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Ask, 10, 100, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(2, Side::Ask, 8, 100, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(3, Side::Ask, 9, 100, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(market(5, Side::Bid, 20)).unwrap();

    assert_eq!(book.last_executed_price_raw(), 8);
    assert_eq!(book.get_order(2).unwrap().open_quantity, 80);
    assert!(book.get_order(5).is_none(), "market order never rests");
}

#[test]
fn scenario_4_stop_fok_is_rejected() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Ask, 10, 100, TimeInForce::GoodTillCancel)).unwrap();

    let err = Order::new(
        6,
        0,
        Side::Bid,
        OrderType::Stop,
        TimeInForce::FillOrKill,
        0,
        5,
        0,
        10,
    )
    .unwrap_err();
    assert!(matches!(err, OrderBookError::IncompatibleTimeInForce { .. }));
}

#[test]
fn scenario_5_crossing_price_activates_resting_stop() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Ask, 30, 100, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(2, Side::Bid, 10, 50, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(stop(3, Side::Bid, 20, 8, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(4, Side::Ask, 5, 20, TimeInForce::GoodTillCancel)).unwrap();

    let id1 = book.get_order(1).unwrap();
    assert_eq!(id1.open_quantity, 92);
    assert_eq!(id1.price, 30);
    let id2 = book.get_order(2).unwrap();
    assert_eq!(id2.open_quantity, 30);
    assert_eq!(book.last_executed_price_raw(), 10);
    assert!(book.get_order(3).is_none(), "activated stop is consumed, not left resting");
}

#[test]
fn scenario_6_time_priority_among_equal_price_bids() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Bid, 100, 10, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(2, Side::Bid, 100, 10, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(3, Side::Ask, 100, 15, TimeInForce::GoodTillCancel)).unwrap();

    assert!(book.get_order(1).is_none(), "id 1 arrived first and is fully filled");
    assert_eq!(book.get_order(2).unwrap().open_quantity, 5);
    assert_eq!(book.last_executed_price_raw(), 100);
}

#[test]
fn law_add_cancel_idempotence() {
    let book = OrderBook::new(0);
    let before_bid = book.best_bid();
    let before_ask = book.best_ask();

    book.add_order(limit(1, Side::Bid, 50, 10, TimeInForce::GoodTillCancel)).unwrap();
    book.delete_order(1).unwrap();

    assert_eq!(book.best_bid(), before_bid);
    assert_eq!(book.best_ask(), before_ask);
    assert_eq!(book.order_count(), 0);
}

#[test]
fn law_replace_equivalence() {
    let replaced = OrderBook::new(0);
    replaced.add_order(limit(1, Side::Bid, 50, 10, TimeInForce::GoodTillCancel)).unwrap();
    replaced.replace_order(1, 2, 60).unwrap();

    let manual = OrderBook::new(0);
    manual.add_order(limit(1, Side::Bid, 50, 10, TimeInForce::GoodTillCancel)).unwrap();
    manual.delete_order(1).unwrap();
    manual.add_order(limit(2, Side::Bid, 60, 10, TimeInForce::GoodTillCancel)).unwrap();

    assert_eq!(replaced.best_bid(), manual.best_bid());
    assert_eq!(replaced.order_count(), manual.order_count());
    assert_eq!(replaced.get_order(2).unwrap().price, manual.get_order(2).unwrap().price);
}

#[test]
fn law_aggressor_pays_resting_price() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Bid, 100, 10, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(2, Side::Ask, 90, 10, TimeInForce::GoodTillCancel)).unwrap();

    assert_eq!(book.last_executed_price_raw(), 100);
}

#[test]
fn law_conservation_of_quantity() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Bid, 100, 10, TimeInForce::GoodTillCancel)).unwrap();
    book.add_order(limit(2, Side::Ask, 100, 4, TimeInForce::GoodTillCancel)).unwrap();

    let remaining = book.get_order(1).unwrap();
    assert_eq!(remaining.executed_quantity + remaining.open_quantity, remaining.original_quantity);
}
