/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Top-of-book snapshots, spec §4.4 "Snapshot" and §6 "Subscription
//! interface".
//!
//! Grounded on the teacher crate's `snapshot.rs` (`OrderBookSnapshot`/
//! `OrderBookSnapshotPackage`), trimmed to the fields spec §6 actually names
//! and re-keyed to `u64` prices/quantities (spec §1 forbids decimal prices,
//! so there is no `PriceLevelSnapshot` to delegate to).

use crate::book::book::OrderBook;
use crate::book::error::OrderBookError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One aggregated price level as reported in a snapshot: a price and the
/// summed open quantity resting there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLevel {
    /// The level's price (limit price; snapshots never include stop/
    /// trailing-stop levels, which are not part of the visible book).
    pub price: u64,
    /// Aggregate open quantity resting at this price.
    pub volume: u64,
}

/// An immutable top-of-book view: best prices, the top N levels per side,
/// and trade statistics, per spec §6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The symbol this snapshot describes.
    pub symbol_id: u64,
    /// Top bid levels, descending by price.
    pub bids: Vec<SnapshotLevel>,
    /// Top ask levels, ascending by price.
    pub asks: Vec<SnapshotLevel>,
    /// `lastExecutedPrice`; 0 means no trades yet.
    pub last_executed_price: u64,
    /// Highest resting bid price, or 0 if the bid side is empty.
    pub best_bid: u64,
    /// Lowest resting ask price, or `u64::MAX` if the ask side is empty.
    pub best_ask: u64,
    /// `bestAsk - bestBid`; `None` when either side is empty.
    pub spread: Option<u64>,
    /// Producer timestamp, monotonic nanoseconds since epoch.
    pub timestamp_ns: u64,
}

impl OrderBook {
    /// The top `n` levels on `side`: bids descending by price, asks
    /// ascending, as `(price, aggregateVolume)` pairs.
    #[must_use]
    pub fn top_n(&self, side: crate::book::order::Side, n: usize) -> Vec<SnapshotLevel> {
        let pairs = match side {
            crate::book::order::Side::Bid => self.bid_levels.top_n_descending(n),
            crate::book::order::Side::Ask => self.ask_levels.top_n_ascending(n),
        };
        pairs
            .into_iter()
            .map(|(price, volume)| SnapshotLevel { price, volume })
            .collect()
    }

    /// Builds a top-of-book snapshot with `depth` levels per side.
    /// `timestamp_ns` is supplied by the caller (the engine, which owns the
    /// monotonic clock); the core itself never reads wall-clock time.
    #[must_use]
    pub fn snapshot(&self, depth: usize, timestamp_ns: u64) -> Snapshot {
        Snapshot {
            symbol_id: self.symbol_id,
            bids: self.top_n(crate::book::order::Side::Bid, depth),
            asks: self.top_n(crate::book::order::Side::Ask, depth),
            last_executed_price: self.last_executed_price_raw(),
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
            spread: self.spread(),
            timestamp_ns,
        }
    }
}

/// Format version used for checksum-enabled snapshot packages on the wire.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Wrapper that provides checksum validation for a `Snapshot`, for producers
/// and consumers that cross a process boundary (spec §6 "Snapshot wire
/// format": "implementations must be wire-compatible across producers and
/// consumers").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPackage {
    /// Version of the snapshot schema, for forward compatibility.
    pub version: u32,
    /// The snapshot payload.
    pub snapshot: Snapshot,
    /// Hex-encoded SHA-256 checksum of the serialized snapshot.
    pub checksum: String,
}

impl SnapshotPackage {
    /// Wraps `snapshot`, computing its checksum.
    pub fn new(snapshot: Snapshot) -> Result<Self, OrderBookError> {
        let checksum = Self::compute_checksum(&snapshot)?;
        Ok(Self {
            version: SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    /// Serializes the package to JSON.
    pub fn to_json(&self) -> Result<String, OrderBookError> {
        serde_json::to_string(self).map_err(|e| OrderBookError::InvariantViolation(format!(
            "snapshot serialization failed: {e}"
        )))
    }

    /// Deserializes the package from JSON.
    pub fn from_json(data: &str) -> Result<Self, OrderBookError> {
        serde_json::from_str(data).map_err(|e| OrderBookError::InvariantViolation(format!(
            "snapshot deserialization failed: {e}"
        )))
    }

    /// Validates the checksum and schema version.
    pub fn validate(&self) -> Result<(), OrderBookError> {
        if self.version != SNAPSHOT_FORMAT_VERSION {
            return Err(OrderBookError::InvalidOperation {
                message: format!(
                    "unsupported snapshot version: {} (expected {})",
                    self.version, SNAPSHOT_FORMAT_VERSION
                ),
            });
        }
        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(OrderBookError::InvalidOperation {
                message: format!(
                    "snapshot checksum mismatch: expected {}, computed {computed}",
                    self.checksum
                ),
            });
        }
        Ok(())
    }

    fn compute_checksum(snapshot: &Snapshot) -> Result<String, OrderBookError> {
        let payload = serde_json::to_vec(snapshot).map_err(|e| {
            OrderBookError::InvariantViolation(format!("snapshot checksum encode failed: {e}"))
        })?;
        let mut hasher = Sha256::new();
        hasher.update(payload);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::order::{OrderType, Side, TimeInForce};

    fn limit(id: u64, side: Side, price: u64, qty: u64) -> crate::book::order::Order {
        crate::book::order::Order::new(
            id,
            0,
            side,
            OrderType::Limit,
            TimeInForce::GoodTillCancel,
            price,
            0,
            0,
            qty,
        )
        .unwrap()
    }

    #[test]
    fn top_n_reports_aggregated_levels() {
        let book = OrderBook::new(0);
        book.add_order(limit(1, Side::Bid, 10, 5)).unwrap();
        book.add_order(limit(2, Side::Bid, 10, 7)).unwrap();
        book.add_order(limit(3, Side::Bid, 9, 3)).unwrap();

        let top = book.top_n(Side::Bid, 5);
        assert_eq!(top, vec![
            SnapshotLevel { price: 10, volume: 12 },
            SnapshotLevel { price: 9, volume: 3 },
        ]);
    }

    #[test]
    fn snapshot_package_roundtrips_and_detects_tamper() {
        let book = OrderBook::new(7);
        book.add_order(limit(1, Side::Ask, 30, 100)).unwrap();
        let snap = book.snapshot(10, 123);
        let pkg = SnapshotPackage::new(snap).unwrap();
        let json = pkg.to_json().unwrap();
        let restored = SnapshotPackage::from_json(&json).unwrap();
        restored.validate().unwrap();

        let mut tampered = restored;
        tampered.snapshot.last_executed_price = 999;
        assert!(tampered.validate().is_err());
    }
}
