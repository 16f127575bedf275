/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Error types for the order book core.
//!
//! Spec §7 splits failures into two classes: input errors, rejected before
//! any mutation, and invariant violations, which are fatal bugs. This module
//! carries both: `OrderBookError` for the former (plus a handful of
//! defensive, should-never-happen checks inside `Level`/`LevelMap`), and
//! `InvariantViolation` (in `book::validate`) for the latter.

use crate::book::order::{OrderType, TimeInForce};
use std::fmt;

/// Errors rejected before any state mutation, or surfaced from a component
/// that detected misuse of its own internal invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OrderBookError {
    /// `DeleteOrder`/`CancelOrder`/`ReplaceOrder`/`ExecuteOrder` referenced
    /// an id not present in the order index.
    OrderNotFound {
        /// The id that was not found.
        order_id: u64,
    },
    /// Construction requested zero quantity.
    ZeroQuantity {
        /// The order id being constructed.
        order_id: u64,
    },
    /// `CancelOrder`/`ExecuteOrder` requested a non-positive quantity or
    /// price where one is required to be positive.
    InvalidQuantity {
        /// The order the request targeted.
        order_id: u64,
        /// The offending quantity.
        quantity: u64,
    },
    /// `ExecuteOrder`'s specified-price variant requested price zero.
    InvalidPrice {
        /// The order the request targeted.
        order_id: u64,
    },
    /// Construction requested a type/TIF pair spec §3 forbids.
    IncompatibleTimeInForce {
        /// The order id being constructed.
        order_id: u64,
        /// The requested type.
        order_type: OrderType,
        /// The requested time-in-force.
        tif: TimeInForce,
    },
    /// `AddOrder` reused an id already present in the order index.
    DuplicateOrderId {
        /// The id that already exists.
        order_id: u64,
    },
    /// A FOK order could not be fully covered by resting opposite liquidity;
    /// rejected before any matching occurred.
    FokUnfillable {
        /// The order id that could not be covered.
        order_id: u64,
    },
    /// A command referenced an order by id but the order's current state
    /// makes the command nonsensical (e.g. cancelling a filled order).
    InvalidOperation {
        /// Human-readable detail.
        message: String,
    },
    /// A component detected its own invariant had already been violated —
    /// a defensive check distinct from the post-command `validate_orderbook`
    /// pass but reported the same way: as a bug, not a user input error.
    InvariantViolation(String),
    /// `Level::pop_front`/`pop_back` called on an empty queue.
    EmptyLevel {
        /// The level's key price.
        price: u64,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::OrderNotFound { order_id } => {
                write!(f, "order not found: {order_id}")
            }
            OrderBookError::ZeroQuantity { order_id } => {
                write!(f, "order {order_id}: quantity must be nonzero")
            }
            OrderBookError::InvalidQuantity {
                order_id,
                quantity,
            } => write!(
                f,
                "order {order_id}: invalid quantity {quantity}, must be positive"
            ),
            OrderBookError::InvalidPrice { order_id } => {
                write!(f, "order {order_id}: price must be positive")
            }
            OrderBookError::IncompatibleTimeInForce {
                order_id,
                order_type,
                tif,
            } => write!(
                f,
                "order {order_id}: {order_type} orders are incompatible with {tif}"
            ),
            OrderBookError::DuplicateOrderId { order_id } => {
                write!(f, "duplicate order id: {order_id}")
            }
            OrderBookError::FokUnfillable { order_id } => write!(
                f,
                "order {order_id}: fill-or-kill could not be fully covered"
            ),
            OrderBookError::InvalidOperation { message } => write!(f, "invalid operation: {message}"),
            OrderBookError::InvariantViolation(message) => {
                write!(f, "invariant violation: {message}")
            }
            OrderBookError::EmptyLevel { price } => {
                write!(f, "level at price {price} is empty")
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
