use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use venue_orderbook::{Order, OrderBook, OrderType, Side, TimeInForce};

fn add_limit_orders(c: &mut Criterion) {
    let mut group = c.benchmark_group("OrderBook - Add Limit Orders");

    for &order_count in &[100, 1_000, 10_000, 50_000] {
        group.bench_with_input(
            BenchmarkId::new("add_order", order_count),
            &order_count,
            |b, &count| {
                b.iter_with_setup(
                    || OrderBook::new(0),
                    |book| {
                        for i in 0..count {
                            let side = if i % 2 == 0 { Side::Bid } else { Side::Ask };
                            let price = if side == Side::Bid { 1_000 - (i % 500) } else { 1_500 + (i % 500) };
                            let order = Order::new(
                                i + 1,
                                0,
                                side,
                                OrderType::Limit,
                                TimeInForce::GoodTillCancel,
                                price,
                                0,
                                0,
                                10,
                            )
                            .unwrap();
                            black_box(book.add_order(order).unwrap());
                        }
                    },
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, add_limit_orders);
criterion_main!(benches);
