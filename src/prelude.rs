/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Convenience re-export of the crate's public surface.
//!
//! ```
//! use venue_orderbook::prelude::*;
//! ```

pub use crate::book::{
    MapKind, MatchResult, Order, OrderBook, OrderBookError, OrderType, RestingAt, Side, Snapshot,
    SnapshotLevel, TimeInForce, Transaction, TradeListener, PRICE_MAX,
};
pub use crate::commands::{Command, CommandAck};
pub use crate::config::{ConfigError, ExchangeConfig, MulticastConfig, SharedMemoryConfig, SymbolConfig};
pub use crate::engine::{Engine, EngineRequest};
pub use crate::exchange::{Exchange, SymbolInfo};
pub use crate::fanout::{FanoutRegistry, Subscription};
pub use crate::ids::new_order_id;

#[cfg(feature = "wire")]
pub use crate::wire::{self, WireError, MAX_FRAME_LEN};

#[cfg(feature = "multicast")]
pub use crate::multicast::MulticastPublisher;

#[cfg(feature = "shm")]
pub use crate::shm::{ShmConsumer, ShmError, ShmProducer};
