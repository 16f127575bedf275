//! Input-error rejections, spec §7: "rejected before mutation", engine state
//! unchanged. Grounded in style on the teacher crate's
//! `tests/unit/validation_tests.rs`.

use venue_orderbook::prelude::*;

fn limit(id: u64, side: Side, price: u64, qty: u64) -> Order {
    Order::new(id, 0, side, OrderType::Limit, TimeInForce::GoodTillCancel, price, 0, 0, qty)
        .unwrap()
}

#[test]
fn zero_quantity_is_rejected_at_construction() {
    let err = Order::new(1, 0, Side::Bid, OrderType::Limit, TimeInForce::GoodTillCancel, 10, 0, 0, 0)
        .unwrap_err();
    assert!(matches!(err, OrderBookError::ZeroQuantity { order_id: 1 }));
}

#[test]
fn market_order_forbids_gtc() {
    let err = Order::new(1, 0, Side::Bid, OrderType::Market, TimeInForce::GoodTillCancel, 0, 0, 0, 10)
        .unwrap_err();
    assert!(matches!(err, OrderBookError::IncompatibleTimeInForce { .. }));
}

#[test]
fn trailing_stop_forbids_fok() {
    let err = Order::new(
        1,
        0,
        Side::Ask,
        OrderType::TrailingStop,
        TimeInForce::FillOrKill,
        0,
        0,
        5,
        10,
    )
    .unwrap_err();
    assert!(matches!(err, OrderBookError::IncompatibleTimeInForce { .. }));
}

#[test]
fn stop_limit_accepts_every_tif() {
    for tif in [
        TimeInForce::GoodTillCancel,
        TimeInForce::ImmediateOrCancel,
        TimeInForce::FillOrKill,
    ] {
        Order::new(1, 0, Side::Bid, OrderType::StopLimit, tif, 10, 5, 0, 10).unwrap();
    }
}

#[test]
fn cancel_unknown_order_is_rejected_without_mutation() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Bid, 50, 10)).unwrap();

    let err = book.cancel_order(99, 1).unwrap_err();
    assert!(matches!(err, OrderBookError::OrderNotFound { order_id: 99 }));
    assert_eq!(book.order_count(), 1);
}

#[test]
fn cancel_zero_quantity_is_rejected() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Bid, 50, 10)).unwrap();

    let err = book.cancel_order(1, 0).unwrap_err();
    assert!(matches!(err, OrderBookError::InvalidQuantity { .. }));
    assert_eq!(book.get_order(1).unwrap().open_quantity, 10);
}

#[test]
fn delete_unknown_order_is_rejected() {
    let book = OrderBook::new(0);
    let err = book.delete_order(42).unwrap_err();
    assert!(matches!(err, OrderBookError::OrderNotFound { order_id: 42 }));
}

#[test]
fn duplicate_order_id_is_rejected() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Bid, 50, 10)).unwrap();
    let err = book.add_order(limit(1, Side::Ask, 60, 5)).unwrap_err();
    assert!(matches!(err, OrderBookError::DuplicateOrderId { order_id: 1 }));
}

#[test]
fn fok_without_enough_liquidity_is_rejected_without_partial_fill() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Ask, 10, 5)).unwrap();

    let fok = Order::new(2, 0, Side::Bid, OrderType::Limit, TimeInForce::FillOrKill, 10, 0, 0, 50)
        .unwrap();
    let err = book.add_order(fok).unwrap_err();
    assert!(matches!(err, OrderBookError::FokUnfillable { order_id: 2 }));
    assert_eq!(book.get_order(1).unwrap().open_quantity, 5, "resting order untouched");
    assert!(book.get_order(2).is_none());
}

#[test]
fn ioc_unfilled_remainder_is_discarded_not_an_error() {
    let book = OrderBook::new(0);
    book.add_order(limit(1, Side::Ask, 10, 5)).unwrap();

    let ioc = Order::new(2, 0, Side::Bid, OrderType::Limit, TimeInForce::ImmediateOrCancel, 10, 0, 0, 50)
        .unwrap();
    let result = book.add_order(ioc).unwrap();
    assert_eq!(result.filled_quantity(), 5);
    assert!(book.get_order(2).is_none(), "unfilled IOC remainder never rests");
}
