/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Exchange configuration file format, spec §6 "CLI surface": "a single
//! binary starts one or more exchange instances each with configured symbols
//! and network endpoints."
//!
//! Grounded on `toml`-based configuration as used across the wider example
//! pack (`nautechsystems-nautilus_trader`'s workspace `Cargo.toml` layout and
//! `ricardofrantz-rustbook`'s config parsing) — the teacher crate itself has
//! no configuration file format of its own, so this module is authored fresh
//! in the same declarative, `serde`-derived style as the rest of this repo's
//! wire types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Top-level configuration for one exchange instance: the symbols it serves
/// plus its network egress endpoints (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Depth (levels per side) included in every published snapshot.
    #[serde(default = "default_depth")]
    pub snapshot_depth: usize,
    /// Per-subscriber mailbox capacity (spec §5: "e.g. capacity 5").
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,
    /// Bound on each symbol's command channel.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,
    /// The symbols this instance serves.
    pub symbols: Vec<SymbolConfig>,
    /// Optional UDP multicast egress (spec §6 "Multicast egress").
    #[serde(default)]
    pub multicast: Option<MulticastConfig>,
    /// Optional shared-memory fan-out ring (spec §6 "Shared-memory layout").
    #[serde(default)]
    pub shared_memory: Option<SharedMemoryConfig>,
}

fn default_depth() -> usize {
    10
}

fn default_mailbox_capacity() -> usize {
    crate::fanout::DEFAULT_MAILBOX_CAPACITY
}

fn default_command_buffer() -> usize {
    256
}

/// One symbol this exchange instance serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolConfig {
    /// The numeric symbol id used on every command (spec §3).
    pub symbol_id: u64,
    /// Human-readable ticker, for logs and the CLI surface only.
    pub ticker: String,
}

/// UDP multicast egress configuration (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MulticastConfig {
    /// Multicast group address, e.g. `"239.1.1.1"`.
    pub group: String,
    /// Destination UDP port.
    pub port: u16,
    /// Local interface address to bind the sending socket to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

/// Shared-memory SPMC ring configuration (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedMemoryConfig {
    /// Path to the memory-mapped file.
    pub path: String,
    /// Desired ring capacity (slot count); rounded up to a power of two
    /// per spec §6.
    #[serde(default = "default_ring_capacity")]
    pub capacity: usize,
}

fn default_ring_capacity() -> usize {
    64
}

/// Errors loading or parsing an [`ExchangeConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io(std::io::Error),
    /// The file's contents could not be parsed as valid TOML configuration.
    Parse(toml::de::Error),
    /// The parsed configuration failed a semantic check (e.g. duplicate
    /// symbol ids).
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "reading config file: {e}"),
            ConfigError::Parse(e) => write!(f, "parsing config file: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ExchangeConfig {
    /// Loads and validates configuration from a TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::parse(&text)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: ExchangeConfig = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one symbol must be configured".to_string(),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        for symbol in &self.symbols {
            if !seen.insert(symbol.symbol_id) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate symbol_id {} in configuration",
                    symbol.symbol_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let toml = r#"
            [[symbols]]
            symbol_id = 0
            ticker = "BTCUSD"
        "#;
        let config = ExchangeConfig::parse(toml).unwrap();
        assert_eq!(config.symbols.len(), 1);
        assert_eq!(config.snapshot_depth, 10);
        assert_eq!(config.mailbox_capacity, 5);
    }

    #[test]
    fn rejects_empty_symbol_list() {
        let err = ExchangeConfig::parse("symbols = []").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_duplicate_symbol_ids() {
        let toml = r#"
            [[symbols]]
            symbol_id = 0
            ticker = "BTCUSD"

            [[symbols]]
            symbol_id = 0
            ticker = "BTCUSD2"
        "#;
        let err = ExchangeConfig::parse(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn parses_optional_multicast_and_shm() {
        let toml = r#"
            [[symbols]]
            symbol_id = 0
            ticker = "BTCUSD"

            [multicast]
            group = "239.1.1.1"
            port = 5555

            [shared_memory]
            path = "/tmp/venue.ring"
            capacity = 128
        "#;
        let config = ExchangeConfig::parse(toml).unwrap();
        assert_eq!(config.multicast.unwrap().port, 5555);
        assert_eq!(config.shared_memory.unwrap().capacity, 128);
    }
}
