/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! The synchronous command interface, spec §6 "Command interface".
//!
//! Grounded on the teacher crate's `sequencer::types::{SequencerCommand,
//! SequencerResult}` shape: one variant per book mutation, and a matching
//! result enum carrying either the post-command outcome or a rejection
//! reason. Unlike the teacher's `SequencerCommand<T>`, there is no
//! sequence-number/timestamp envelope here — spec §5 assigns total ordering
//! to the engine's command channel itself, not to a value the core produces.

use crate::book::order::{OrderType, Side, TimeInForce};
use crate::book::trade::MatchResult;

/// One request into a symbol's `OrderBook`, per spec §6's command table.
///
/// This is an in-process interface (spec §6 specifies a wire format only
/// for snapshots, not for commands), so unlike [`crate::book::snapshot::Snapshot`]
/// it carries no `serde` impls.
#[derive(Debug, Clone)]
pub enum Command {
    /// Submit a new order.
    AddOrder {
        /// Unique id for the new order.
        order_id: u64,
        /// The symbol to add to.
        symbol_id: u64,
        /// Which side of the book.
        side: Side,
        /// The order type.
        order_type: OrderType,
        /// Time-in-force.
        tif: TimeInForce,
        /// Limit price (ignored for Market).
        price: u64,
        /// Stop price (Stop/StopLimit only; ignored otherwise).
        stop_price: u64,
        /// Trailing amount (TrailingStop/TrailingStopLimit only).
        trailing_amount: u64,
        /// Requested quantity.
        quantity: u64,
    },
    /// Partially reduce a resting order's open quantity.
    CancelOrder {
        /// The symbol the order rests on.
        symbol_id: u64,
        /// The order to reduce.
        order_id: u64,
        /// How much to reduce by; must be positive.
        quantity: u64,
    },
    /// Fully remove a resting order.
    DeleteOrder {
        /// The symbol the order rests on.
        symbol_id: u64,
        /// The order to remove.
        order_id: u64,
    },
    /// Cancel-and-replace a resting order with a new id and price.
    ReplaceOrder {
        /// The symbol the order rests on.
        symbol_id: u64,
        /// The order being replaced.
        old_order_id: u64,
        /// The id of the replacement order.
        new_order_id: u64,
        /// The replacement's price (or stopPrice for stop-family orders).
        new_price: u64,
    },
    /// Directly execute quantity against a named resting order.
    ExecuteOrder {
        /// The symbol the order rests on.
        symbol_id: u64,
        /// The order to execute against.
        order_id: u64,
        /// Quantity to execute.
        quantity: u64,
        /// Execution price; `None` uses the order's own price.
        price: Option<u64>,
    },
}

impl Command {
    /// The symbol this command targets, common to every variant.
    #[must_use]
    pub fn symbol_id(&self) -> u64 {
        match self {
            Command::AddOrder { symbol_id, .. }
            | Command::CancelOrder { symbol_id, .. }
            | Command::DeleteOrder { symbol_id, .. }
            | Command::ReplaceOrder { symbol_id, .. }
            | Command::ExecuteOrder { symbol_id, .. } => *symbol_id,
        }
    }
}

/// The outcome of executing a [`Command`] against a symbol's `OrderBook`.
#[derive(Debug, Clone)]
pub enum CommandAck {
    /// `AddOrder` was accepted; carries the match result (possibly a
    /// zero-fill Ack for an unmatched IOC/Market order, per spec §7).
    Added(MatchResult),
    /// `CancelOrder`/`DeleteOrder` completed.
    Removed {
        /// The affected order id.
        order_id: u64,
    },
    /// `ReplaceOrder` completed; carries the replacement's match result.
    Replaced(MatchResult),
    /// `ExecuteOrder` completed.
    Executed {
        /// The affected order id.
        order_id: u64,
    },
    /// The command was rejected before any mutation; `reason` is a
    /// human-readable explanation of the input error (spec §7).
    Rejected {
        /// Why the command was rejected.
        reason: String,
    },
}
