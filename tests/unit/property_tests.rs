//! Property-based invariant checks, spec §8: "for all states reachable from
//! the empty book by any finite command sequence." Grounded in style on
//! `other_examples`' matching-engine invariant property tests (generator
//! strategies plus a `proptest!` block asserting spec invariants after
//! replaying a random command sequence).

use proptest::prelude::*;
use venue_orderbook::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AddLimit { id: u64, side: Side, price: u64, qty: u64 },
    AddMarket { id: u64, side: Side, qty: u64 },
    Cancel { id: u64, qty: u64 },
    Delete { id: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u64..20, side_strategy(), 1u64..50, 1u64..20)
            .prop_map(|(id, side, price, qty)| Op::AddLimit { id, side, price, qty }),
        (1u64..20, side_strategy(), 1u64..20).prop_map(|(id, side, qty)| Op::AddMarket { id, side, qty }),
        (1u64..20, 1u64..20).prop_map(|(id, qty)| Op::Cancel { id, qty }),
        (1u64..20).prop_map(|id| Op::Delete { id }),
    ]
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop_oneof![Just(Side::Bid), Just(Side::Ask)]
}

fn op_sequence_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op_strategy(), 0..200)
}

/// Applies `op` against `book`, tracking which ids have already been used so
/// repeated `AddLimit`/`AddMarket` picks on the same id fall back to a fresh
/// one rather than hitting the `DuplicateOrderId` rejection path every time.
fn apply(book: &OrderBook, op: Op, next_fresh_id: &mut u64) {
    match op {
        Op::AddLimit { id, side, price, qty } => {
            let id = if book.get_order(id).is_some() {
                *next_fresh_id += 1;
                1_000_000 + *next_fresh_id
            } else {
                id
            };
            if let Ok(order) = Order::new(id, 0, side, OrderType::Limit, TimeInForce::GoodTillCancel, price, 0, 0, qty) {
                let _ = book.add_order(order);
            }
        }
        Op::AddMarket { id, side, qty } => {
            let id = if book.get_order(id).is_some() {
                *next_fresh_id += 1;
                1_000_000 + *next_fresh_id
            } else {
                id
            };
            if let Ok(order) = Order::new(id, 0, side, OrderType::Market, TimeInForce::ImmediateOrCancel, 0, 0, 0, qty) {
                let _ = book.add_order(order);
            }
        }
        Op::Cancel { id, qty } => {
            let _ = book.cancel_order(id, qty);
        }
        Op::Delete { id } => {
            let _ = book.delete_order(id);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Invariant #3 (spec §8): no crossed book at rest, for any reachable
    /// state. `add_order`/`cancel_order`/`delete_order` already run
    /// `validate_orderbook` internally and panic on violation, so a run that
    /// returns at all without panicking has already passed every other
    /// invariant too; this assertion re-derives the crossing check from the
    /// publicly observable `best_bid`/`best_ask` as an end-to-end sanity
    /// check on top of that.
    #[test]
    fn prop_book_never_crosses_at_rest(ops in op_sequence_strategy()) {
        let book = OrderBook::new(0);
        let mut next_fresh_id = 0u64;
        for op in ops {
            apply(&book, op, &mut next_fresh_id);
        }
        let bid = book.best_bid();
        let ask = book.best_ask();
        if bid != 0 && ask != PRICE_MAX {
            prop_assert!(bid < ask, "crossed book: bestBid={bid} >= bestAsk={ask}");
        }
    }

    /// Invariant #1 (spec §8): every order's `executed + open == original`
    /// throughout its lifetime, checked on whatever orders remain in the
    /// index after a random sequence.
    #[test]
    fn prop_quantity_conservation_holds_for_surviving_orders(ops in op_sequence_strategy()) {
        let book = OrderBook::new(0);
        let mut next_fresh_id = 0u64;
        let mut seen_ids = Vec::new();
        for op in ops {
            if let Op::AddLimit { id, .. } | Op::AddMarket { id, .. } = &op {
                seen_ids.push(*id);
            }
            apply(&book, op, &mut next_fresh_id);
        }
        for id in seen_ids {
            if let Some(order) = book.get_order(id) {
                prop_assert_eq!(
                    order.executed_quantity + order.open_quantity,
                    order.original_quantity
                );
                prop_assert!(order.open_quantity > 0, "a resting order must have positive open quantity");
            }
        }
    }
}
