//! # venue-orderbook
//!
//! A limit order book matching engine core: price-time-priority matching
//! per symbol, stop and trailing-stop activation, and snapshot/notification
//! fan-out, with a thin outer layer that routes commands to one engine per
//! symbol and publishes snapshots to subscribers over in-process channels,
//! a length-delimited wire format, UDP multicast, and a shared-memory ring.
//!
//! ## Core
//!
//! - [`book`] — `Order`, `Level`, `LevelMap`, and `OrderBook`, the engine
//!   itself: add/cancel/replace/execute, the matching loop, stop and
//!   trailing-stop activation, and invariant validation.
//! - [`commands`] — the `Command`/`CommandAck` wire between a caller and an
//!   `OrderBook`.
//! - [`engine`] — `Engine`, the single-writer async command loop around one
//!   symbol's `OrderBook`.
//! - [`fanout`] — bounded-mailbox snapshot subscriptions published after
//!   every settled command.
//!
//! ## Outer collaborators
//!
//! - [`exchange`] — `Exchange`, routing commands to the right symbol's
//!   `Engine`.
//! - [`config`] — TOML configuration for an exchange instance.
//! - [`ids`] — order id generation.
//! - [`wire`] *(feature `wire`)* — length-delimited snapshot framing.
//! - [`multicast`] *(feature `multicast`)* — UDP multicast snapshot egress.
//! - [`shm`] *(feature `shm`)* — shared-memory SPMC snapshot ring.
//!
//! Orders and executions are integer ticks and integer units throughout —
//! no decimal or floating-point prices, per the matching engine's scope.

pub mod book;
pub mod commands;
pub mod config;
pub mod engine;
pub mod exchange;
pub mod fanout;
pub mod ids;

#[cfg(feature = "multicast")]
pub mod multicast;
#[cfg(feature = "shm")]
pub mod shm;
#[cfg(feature = "wire")]
pub mod wire;

pub mod prelude;

pub use book::{
    MapKind, MatchResult, Order, OrderBook, OrderBookError, OrderType, RestingAt, Side, Snapshot,
    SnapshotLevel, TimeInForce, Transaction, TradeListener, PRICE_MAX,
};
pub use commands::{Command, CommandAck};
pub use config::{ConfigError, ExchangeConfig, MulticastConfig, SharedMemoryConfig, SymbolConfig};
pub use engine::{Engine, EngineRequest};
pub use exchange::{Exchange, SymbolInfo};
pub use fanout::{FanoutRegistry, Subscription};
pub use ids::new_order_id;
