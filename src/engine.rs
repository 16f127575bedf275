/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! The per-symbol single-writer execution context, spec §5.
//!
//! Grounded on spec §5's "per-symbol single-writer" model and the teacher
//! crate's `manager.rs` per-book task pattern (`BookManagerTokio`'s
//! `start_trade_processor`): one `OrderBook` wrapped by a serial command
//! loop that never suspends on I/O inside a mutation, publishing a snapshot
//! to the fan-out registry after every command settles.

use crate::book::OrderBookError;
use crate::book::order::Order;
use crate::commands::{Command, CommandAck as Ack};
use crate::fanout::FanoutRegistry;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, oneshot};
use tracing::{error, trace, warn};

/// A request into the engine's command loop: the command plus a one-shot
/// reply channel, mirroring spec §5's synchronous request/response command
/// channel.
pub struct EngineRequest {
    /// The command to execute.
    pub command: Command,
    /// Where to send the result.
    pub reply: oneshot::Sender<Ack>,
}

/// Owns one `OrderBook` and the fan-out registry publishing its snapshots.
///
/// All mutating access to the book goes through [`Engine::run`]'s serial
/// command loop; nothing else is permitted to call into the book directly
/// (spec §5: "exactly one command is in flight at a time").
pub struct Engine {
    book: crate::book::OrderBook,
    depth: usize,
    fanout: FanoutRegistry,
}

impl Engine {
    /// A fresh engine for `symbol_id`, publishing `depth` levels per side in
    /// every snapshot.
    #[must_use]
    pub fn new(symbol_id: u64, depth: usize) -> Self {
        Self {
            book: crate::book::OrderBook::new(symbol_id),
            depth,
            fanout: FanoutRegistry::new(),
        }
    }

    /// The symbol this engine serves.
    #[must_use]
    pub fn symbol_id(&self) -> u64 {
        self.book.symbol_id
    }

    /// Registers a new subscriber, returning a handle to its mailbox (spec
    /// §5 "Notification fan-out").
    #[must_use]
    pub fn subscribe(&self) -> crate::fanout::Subscription {
        self.fanout.subscribe()
    }

    /// Runs the serial command loop until the channel closes. Never awaits
    /// anything except the next command — spec §5 "No suspension inside the
    /// engine".
    pub async fn run(self: Arc<Self>, mut commands: mpsc::Receiver<EngineRequest>) {
        while let Some(req) = commands.recv().await {
            let ack = self.dispatch(req.command);
            let snapshot = self.book.snapshot(self.depth, monotonic_nanos());
            self.fanout.publish(snapshot);
            if req.reply.send(ack).is_err() {
                warn!(symbol_id = self.book.symbol_id, "engine: caller dropped reply channel");
            }
        }
        trace!(symbol_id = self.book.symbol_id, "engine: command channel closed, stopping");
    }

    /// Executes one command synchronously against the book, translating
    /// [`OrderBookError`] into a rejection rather than propagating it — per
    /// spec §7, input errors are reported to the caller with no state
    /// change, never treated as fatal.
    fn dispatch(&self, command: Command) -> Ack {
        match command {
            Command::AddOrder {
                order_id,
                symbol_id,
                side,
                order_type,
                tif,
                price,
                stop_price,
                trailing_amount,
                quantity,
            } => {
                let order = match Order::new(
                    order_id,
                    symbol_id,
                    side,
                    order_type,
                    tif,
                    price,
                    stop_price,
                    trailing_amount,
                    quantity,
                ) {
                    Ok(o) => o,
                    Err(e) => return reject(e),
                };
                match self.book.add_order(order) {
                    Ok(result) => Ack::Added(result),
                    Err(e) => reject(e),
                }
            }
            Command::CancelOrder { order_id, quantity, .. } => {
                match self.book.cancel_order(order_id, quantity) {
                    Ok(()) => Ack::Removed { order_id },
                    Err(e) => reject(e),
                }
            }
            Command::DeleteOrder { order_id, .. } => match self.book.delete_order(order_id) {
                Ok(()) => Ack::Removed { order_id },
                Err(e) => reject(e),
            },
            Command::ReplaceOrder {
                old_order_id,
                new_order_id,
                new_price,
                ..
            } => match self.book.replace_order(old_order_id, new_order_id, new_price) {
                Ok(result) => Ack::Replaced(result),
                Err(e) => reject(e),
            },
            Command::ExecuteOrder {
                order_id,
                quantity,
                price,
                ..
            } => match self.book.execute_order(order_id, quantity, price) {
                Ok(()) => Ack::Executed { order_id },
                Err(e) => reject(e),
            },
        }
    }

    /// Direct, in-process access to the underlying book — used by tests and
    /// by callers that embed the engine without going through the channel
    /// (e.g. a single-threaded CLI demo).
    #[must_use]
    pub fn book(&self) -> &crate::book::OrderBook {
        &self.book
    }
}

fn reject(e: OrderBookError) -> Ack {
    error!(error = %e, "command rejected");
    Ack::Rejected { reason: e.to_string() }
}

fn monotonic_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::order::{OrderType, Side, TimeInForce};

    fn add(order_id: u64, side: Side, price: u64, quantity: u64) -> Command {
        Command::AddOrder {
            order_id,
            symbol_id: 0,
            side,
            order_type: OrderType::Limit,
            tif: TimeInForce::GoodTillCancel,
            price,
            stop_price: 0,
            trailing_amount: 0,
            quantity,
        }
    }

    #[tokio::test]
    async fn run_loop_acks_commands_and_publishes_snapshots() {
        let engine = Arc::new(Engine::new(0, 5));
        let sub = engine.subscribe();
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(engine.clone().run(rx));

        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(EngineRequest {
            command: add(1, Side::Bid, 100, 10),
            reply: reply_tx,
        })
        .await
        .unwrap();
        let ack = reply_rx.await.unwrap();
        assert!(matches!(ack, Ack::Added(_)));

        let snap = sub.recv().await;
        assert_eq!(snap.bids.len(), 1);
        assert_eq!(snap.bids[0].price, 100);

        drop(tx);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn unknown_order_id_is_rejected_not_fatal() {
        let engine = Arc::new(Engine::new(0, 5));
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(engine.clone().run(rx));

        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(EngineRequest {
            command: Command::DeleteOrder { symbol_id: 0, order_id: 999 },
            reply: reply_tx,
        })
        .await
        .unwrap();
        assert!(matches!(reply_rx.await.unwrap(), Ack::Rejected { .. }));

        drop(tx);
        handle.await.unwrap();
    }
}
