/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Library half of the `venue-cli` binary: config loading, exchange
//! start-up, and the egress tasks that forward each symbol's snapshots to
//! whichever transports the configuration enables.
//!
//! Grounded on the teacher pack's `nautechsystems-nautilus_trader`
//! `crates/cli/src/lib.rs` (a thin `run(cli) -> Result<(), Error>` dispatched
//! from `src/bin/cli.rs`, with `log::error!`/exit-code handling left to the
//! binary).

pub mod opt;

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use venue_orderbook::prelude::*;

/// Errors surfaced by the CLI, each mapping to a nonzero exit code per spec
/// §6 ("nonzero on bind/listen failure or invariant violation").
#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Wire(WireError),
    Shm(ShmError),
    InvalidAddress(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "{e}"),
            CliError::Wire(e) => write!(f, "{e}"),
            CliError::Shm(e) => write!(f, "{e}"),
            CliError::InvalidAddress(s) => write!(f, "invalid address: {s}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<WireError> for CliError {
    fn from(e: WireError) -> Self {
        CliError::Wire(e)
    }
}

impl From<ShmError> for CliError {
    fn from(e: ShmError) -> Self {
        CliError::Shm(e)
    }
}

/// Dispatches a parsed [`opt::VenueCli`] to the matching subcommand.
pub async fn run(cli: opt::VenueCli) -> Result<(), CliError> {
    match cli.command {
        opt::Commands::Validate(opt) => {
            let config = ExchangeConfig::load(&opt.config)?;
            info!(symbols = config.symbols.len(), "configuration is valid");
            Ok(())
        }
        opt::Commands::Run(opt) => run_exchange(opt).await,
    }
}

async fn run_exchange(opt: opt::RunOpt) -> Result<(), CliError> {
    let config = ExchangeConfig::load(&opt.config)?;
    let mut exchange = Exchange::new(config.snapshot_depth, config.command_buffer);
    for symbol in &config.symbols {
        exchange.add_symbol(symbol.symbol_id, symbol.ticker.clone());
        info!(symbol_id = symbol.symbol_id, ticker = %symbol.ticker, "registered symbol");
    }

    let mut egress_tasks = Vec::new();

    if let Some(mc) = &config.multicast {
        let group: Ipv4Addr = mc
            .group
            .parse()
            .map_err(|_| CliError::InvalidAddress(mc.group.clone()))?;
        let bind_addr: Ipv4Addr = mc
            .bind_addr
            .parse()
            .map_err(|_| CliError::InvalidAddress(mc.bind_addr.clone()))?;
        let publisher = Arc::new(MulticastPublisher::bind(bind_addr, group, mc.port).await?);
        for symbol in &config.symbols {
            let sub = exchange
                .subscribe(symbol.symbol_id)
                .expect("symbol just registered");
            let publisher = Arc::clone(&publisher);
            egress_tasks.push(tokio::spawn(async move {
                loop {
                    let snapshot = sub.recv().await;
                    if let Err(e) = publisher.publish(&snapshot).await {
                        error!(error = %e, "multicast publish failed");
                    }
                }
            }));
        }
    }

    if let Some(shm_cfg) = &config.shared_memory {
        let producer = ShmProducer::create(&shm_cfg.path, shm_cfg.capacity)?;
        let producer = Arc::new(Mutex::new(producer));
        for symbol in &config.symbols {
            let sub = exchange
                .subscribe(symbol.symbol_id)
                .expect("symbol just registered");
            let producer = Arc::clone(&producer);
            egress_tasks.push(tokio::spawn(async move {
                loop {
                    let snapshot = sub.recv().await;
                    let frame = match venue_orderbook::wire::encode_frame(&snapshot) {
                        Ok(f) => f,
                        Err(e) => {
                            error!(error = %e, "shared-memory frame encode failed");
                            continue;
                        }
                    };
                    if let Err(e) = producer.lock().await.publish(&frame) {
                        error!(error = %e, "shared-memory publish failed");
                    }
                }
            }));
        }
    }

    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    info!("shutting down");
    for task in egress_tasks {
        task.abort();
    }
    exchange.shutdown().await;
    Ok(())
}
