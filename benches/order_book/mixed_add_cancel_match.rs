use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use venue_orderbook::{Order, OrderBook, OrderType, Side, TimeInForce};

/// Populates `book` with `count` resting bids across a band of prices below
/// 1000 and `count` resting asks above it, leaving both sides non-empty but
/// non-crossing.
fn populate(book: &OrderBook, count: u64) {
    for i in 0..count {
        let bid = Order::new(
            i + 1,
            0,
            Side::Bid,
            OrderType::Limit,
            TimeInForce::GoodTillCancel,
            900 - (i % 400),
            0,
            0,
            10,
        )
        .unwrap();
        book.add_order(bid).unwrap();

        let ask = Order::new(
            count + i + 1,
            0,
            Side::Ask,
            OrderType::Limit,
            TimeInForce::GoodTillCancel,
            1_100 + (i % 400),
            0,
            0,
            10,
        )
        .unwrap();
        book.add_order(ask).unwrap();
    }
}

fn mixed_workload(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderBook - Mixed Add/Cancel/Match");

    for &order_count in &[100, 1_000, 10_000] {
        group.bench_with_input(
            BenchmarkId::new("add_cancel_match", order_count),
            &order_count,
            |b, &count| {
                b.iter_with_setup(
                    || {
                        let book = OrderBook::new(0);
                        populate(&book, count);
                        book
                    },
                    |book| {
                        let next_id = 2 * count + 1;
                        // Crossing limit orders that match against the best resting
                        // levels on both sides.
                        let crossing_bid = Order::new(
                            next_id,
                            0,
                            Side::Bid,
                            OrderType::Limit,
                            TimeInForce::GoodTillCancel,
                            1_200,
                            0,
                            0,
                            50,
                        )
                        .unwrap();
                        black_box(book.add_order(crossing_bid).unwrap());

                        // Cancel a handful of still-resting orders from the
                        // populated book.
                        for i in 1..=count.min(50) {
                            let _ = black_box(book.cancel_order(i, 5));
                        }
                    },
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, mixed_workload);
criterion_main!(benches);
