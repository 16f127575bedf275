/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! The matching core: components A–D from spec §2 (Order, Level, LevelMap,
//! OrderBook) plus the value types that sit at its edges (errors, trade
//! records, snapshots).

pub mod book;
pub mod error;
pub mod level;
pub mod level_map;
mod matching;
pub mod order;
mod stops;
pub mod snapshot;
pub mod trade;
mod validate;

pub use book::OrderBook;
pub use error::OrderBookError;
pub use order::{MapKind, Order, OrderType, RestingAt, Side, TimeInForce, PRICE_MAX};
pub use snapshot::{Snapshot, SnapshotLevel};
pub use trade::{MatchResult, Transaction, TradeListener};
