/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Multi-symbol router, spec §2 "outer collaborators" and §6's per-symbol
//! command/subscription interface.
//!
//! Grounded on the teacher crate's `manager.rs` (`BookManager` trait,
//! `BookManagerTokio`'s per-book task) and
//! `original_source/internal/exchange/exchange.go`'s `symbolMap`: one
//! [`Engine`] per symbol, each with its own serial command loop, registered
//! under a `symbolId -> handle` table. The router itself owns no book state
//! directly — it only dispatches commands to the right symbol's channel and
//! hands out new subscriptions, matching spec §1's framing of the exchange
//! router as an outer collaborator, not part of the core.

use crate::commands::{Command, CommandAck};
use crate::engine::{Engine, EngineRequest};
use crate::fanout::Subscription;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::info;

/// Static metadata for a registered symbol, independent of book state.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    /// The symbol's numeric id, as carried on every [`Command`].
    pub symbol_id: u64,
    /// A human-readable ticker, for logging and the CLI surface only — the
    /// core itself is keyed entirely by `symbol_id` (spec §3).
    pub ticker: String,
}

struct SymbolHandle {
    info: SymbolInfo,
    commands: mpsc::Sender<EngineRequest>,
    engine: Arc<Engine>,
    task: tokio::task::JoinHandle<()>,
}

/// Routes commands to the right symbol's [`Engine`] and hands out
/// subscriptions, per spec §6.
///
/// Unlike [`Engine`] itself, `Exchange` is not in the single-writer hot path:
/// adding/removing symbols takes `&mut self`, but command dispatch only needs
/// `&self` since each symbol's mutation is already serialized inside its own
/// engine task.
pub struct Exchange {
    symbols: HashMap<u64, SymbolHandle>,
    depth: usize,
    command_buffer: usize,
}

impl Exchange {
    /// A fresh exchange with no registered symbols. `depth` is the number of
    /// levels per side included in every snapshot; `command_buffer` sizes
    /// each symbol's command channel.
    #[must_use]
    pub fn new(depth: usize, command_buffer: usize) -> Self {
        Self {
            symbols: HashMap::new(),
            depth,
            command_buffer,
        }
    }

    /// Registers `symbol_id` under `ticker`, spawning its engine task.
    ///
    /// # Panics
    /// Panics if `symbol_id` is already registered — mirrors the teacher's
    /// original's `AddSymbol`/`AddOrderbook`, which panic on a duplicate
    /// symbol rather than silently overwriting an in-flight book.
    pub fn add_symbol(&mut self, symbol_id: u64, ticker: impl Into<String>) {
        assert!(
            !self.symbols.contains_key(&symbol_id),
            "Exchange::add_symbol: symbol {symbol_id} already registered"
        );
        let engine = Arc::new(Engine::new(symbol_id, self.depth));
        let (tx, rx) = mpsc::channel(self.command_buffer);
        let task = tokio::spawn(engine.clone().run(rx));
        let ticker = ticker.into();
        info!(symbol_id, ticker, "exchange: registered symbol");
        self.symbols.insert(
            symbol_id,
            SymbolHandle {
                info: SymbolInfo { symbol_id, ticker },
                commands: tx,
                engine,
                task,
            },
        );
    }

    /// The static info for every registered symbol.
    #[must_use]
    pub fn symbols(&self) -> Vec<SymbolInfo> {
        self.symbols.values().map(|h| h.info.clone()).collect()
    }

    /// True when `symbol_id` has a running engine.
    #[must_use]
    pub fn has_symbol(&self, symbol_id: u64) -> bool {
        self.symbols.contains_key(&symbol_id)
    }

    /// Submits `command` to its target symbol's engine and awaits the
    /// result. Fails with a rejection if the symbol isn't registered,
    /// without touching any engine state (spec §7 "unknown symbol").
    pub async fn submit(&self, command: Command) -> CommandAck {
        let symbol_id = command.symbol_id();
        let Some(handle) = self.symbols.get(&symbol_id) else {
            return CommandAck::Rejected {
                reason: format!("unknown symbol: {symbol_id}"),
            };
        };
        let (reply, rx) = oneshot::channel();
        if handle
            .commands
            .send(EngineRequest { command, reply })
            .await
            .is_err()
        {
            return CommandAck::Rejected {
                reason: format!("symbol {symbol_id}: engine task is no longer running"),
            };
        }
        rx.await.unwrap_or(CommandAck::Rejected {
            reason: format!("symbol {symbol_id}: engine dropped the reply channel"),
        })
    }

    /// Subscribes to `symbol_id`'s snapshot stream (spec §6 "Subscription
    /// interface"). `None` if the symbol is not registered.
    #[must_use]
    pub fn subscribe(&self, symbol_id: u64) -> Option<Subscription> {
        self.symbols.get(&symbol_id).map(|h| h.engine.subscribe())
    }

    /// Direct, in-process access to a symbol's book — used by the CLI's
    /// synchronous demo mode and by tests.
    #[must_use]
    pub fn book(&self, symbol_id: u64) -> Option<&crate::book::OrderBook> {
        self.symbols.get(&symbol_id).map(|h| h.engine.book())
    }

    /// Shuts down every symbol's engine task by closing its command channel,
    /// then awaits all tasks. Unregisters every symbol.
    pub async fn shutdown(&mut self) {
        let handles: Vec<SymbolHandle> = self.symbols.drain().map(|(_, h)| h).collect();
        for handle in handles {
            drop(handle.commands);
            let _ = handle.task.await;
        }
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new(10, 256)
    }
}
