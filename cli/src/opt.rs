/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Command-line argument definitions, grounded on the teacher pack's
//! `nautechsystems-nautilus_trader` `crates/cli/src/opt.rs` (`clap::Parser`
//! derive, one top-level struct wrapping a `Commands` subcommand enum).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface for running a `venue-orderbook` exchange instance.
#[derive(Debug, Parser)]
#[clap(version, about, author)]
pub struct VenueCli {
    #[clap(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Starts an exchange instance from a TOML configuration file and serves
    /// it until interrupted.
    Run(RunOpt),
    /// Parses and validates a configuration file without starting anything.
    Validate(RunOpt),
}

/// Shared options for `run` and `validate`.
#[derive(Parser, Debug, Clone)]
pub struct RunOpt {
    /// Path to the exchange's TOML configuration file (spec §6).
    #[arg(long, short)]
    pub config: PathBuf,
}
