/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Shared-memory SPMC fan-out ring, spec §6 "Shared-memory layout" and §5
//! "Shared-memory fan-out".
//!
//! Layout, exactly per spec §6: a 24-byte header (`u64 head`,
//! `u64 read_counter`, `u64 num_consumers`) followed by `size` slots of
//! 65,536 bytes each, `size` rounded up to a power of two, each slot
//! beginning with a `u32` length then payload. The producer blocks until all
//! registered consumers have read the previous slot before overwriting it
//! (spec §9 "a slow consumer stalls the producer — acceptable for the
//! intended use").
//!
//! Grounded on the teacher crate's `sequencer::file_journal`'s `MmapMut` +
//! `// SAFETY:` comment convention for the memory-mapping boilerplate, and
//! `original_source/cmd/LeGoTradingEngine/tradingSystem/sharedMemory.go`'s
//! ring design (atomic write index, fixed per-slot buffer size) for the
//! wire layout itself. The header/slot fields are packed with plain
//! `to_le_bytes`/`from_le_bytes` rather than `zerocopy`: the teacher's own
//! `zerocopy` dependency is declared but never called from its own source
//! (grep turns up nothing beyond the `Cargo.toml` feature line), so there is
//! no observed idiom to imitate here; see `DESIGN.md`.

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use memmap2::MmapMut;

/// Fixed per-slot size, spec §6.
pub const SLOT_SIZE: usize = 65_536;
/// Header size, spec §6: `head` + `read_counter` + `num_consumers`, each
/// `u64`.
pub const HEADER_SIZE: usize = 24;

const HEAD_OFFSET: usize = 0;
const READ_COUNTER_OFFSET: usize = 8;
const NUM_CONSUMERS_OFFSET: usize = 16;

/// Errors mapping or operating on the shared-memory ring.
#[derive(Debug)]
pub enum ShmError {
    /// Underlying I/O failure opening or sizing the backing file.
    Io(io::Error),
    /// A payload exceeded `SLOT_SIZE - 4` (the usable space after the
    /// per-slot length prefix).
    PayloadTooLarge {
        /// The rejected payload's length.
        len: usize,
    },
}

impl std::fmt::Display for ShmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShmError::Io(e) => write!(f, "shared-memory I/O error: {e}"),
            ShmError::PayloadTooLarge { len } => {
                write!(f, "payload of {len} bytes exceeds slot capacity {}", SLOT_SIZE - 4)
            }
        }
    }
}

impl std::error::Error for ShmError {}

impl From<io::Error> for ShmError {
    fn from(e: io::Error) -> Self {
        ShmError::Io(e)
    }
}

/// Rounds `n` up to the next power of two, minimum 1.
fn round_up_pow2(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Reads the `u64` at `offset` with atomic acquire semantics. The mapped
/// region is page-aligned, so every header field offset (0, 8, 16) is
/// naturally 8-byte aligned.
fn atomic_read(mmap: &[u8], offset: usize) -> u64 {
    // SAFETY: `offset` is one of the three fixed, 8-byte-aligned header
    // fields, within `HEADER_SIZE` bytes of a mapping at least that large.
    let ptr = mmap[offset..offset + 8].as_ptr() as *const AtomicU64;
    unsafe { (*ptr).load(Ordering::Acquire) }
}

/// Writes the `u64` at `offset` with atomic release semantics.
fn atomic_write(mmap: &mut [u8], offset: usize, value: u64) {
    // SAFETY: see `atomic_read`.
    let ptr = mmap[offset..offset + 8].as_mut_ptr() as *const AtomicU64;
    unsafe { (*ptr).store(value, Ordering::Release) }
}

/// Atomically increments the `u64` at `offset`, returning nothing (callers
/// that need the result use `atomic_read` after).
fn atomic_increment(mmap: &[u8], offset: usize) {
    let ptr = mmap[offset..offset + 8].as_ptr() as *const AtomicU64;
    // SAFETY: see `atomic_read`.
    unsafe { (*ptr).fetch_add(1, Ordering::AcqRel) };
}

/// The single-producer side of the ring: owns the memory-mapped file and
/// blocks publishes until every registered consumer has caught up with the
/// slot being overwritten.
pub struct ShmProducer {
    mmap: MmapMut,
    size: usize,
}

impl ShmProducer {
    /// Creates (or truncates) the backing file at `path`, sized for
    /// `requested_slots` slots rounded up to a power of two, and maps it.
    pub fn create(path: impl AsRef<Path>, requested_slots: usize) -> Result<Self, ShmError> {
        let size = round_up_pow2(requested_slots);
        let total_len = HEADER_SIZE + size * SLOT_SIZE;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(total_len as u64)?;

        // SAFETY: the file is exclusively owned and sized by this process
        // for the lifetime of the mapping; nothing else truncates it while
        // mapped.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        let mut producer = Self { mmap, size };
        atomic_write(&mut producer.mmap, HEAD_OFFSET, 0);
        atomic_write(&mut producer.mmap, READ_COUNTER_OFFSET, 0);
        atomic_write(&mut producer.mmap, NUM_CONSUMERS_OFFSET, 0);
        Ok(producer)
    }

    /// Ring capacity in slots (always a power of two).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.size
    }

    /// Registers one more consumer against the ring, returning the new
    /// total. Consumers must register before the producer publishes, so the
    /// blocking-until-all-read protocol has a correct count from slot 0.
    pub fn register_consumer(&mut self) -> u64 {
        atomic_increment(&self.mmap, NUM_CONSUMERS_OFFSET);
        atomic_read(&self.mmap, NUM_CONSUMERS_OFFSET)
    }

    /// Writes `payload` into the next slot, blocking (busy-polling) until
    /// the read counter shows every registered consumer has already
    /// consumed that slot on its previous lap — spec §9's "a slow consumer
    /// stalls the producer."
    pub fn publish(&mut self, payload: &[u8]) -> Result<(), ShmError> {
        if payload.len() > SLOT_SIZE - 4 {
            return Err(ShmError::PayloadTooLarge { len: payload.len() });
        }

        let head = atomic_read(&self.mmap, HEAD_OFFSET);
        let num_consumers = atomic_read(&self.mmap, NUM_CONSUMERS_OFFSET);

        if num_consumers > 0 && head >= self.size as u64 {
            let required_reads = (head - self.size as u64 + 1) * num_consumers;
            while atomic_read(&self.mmap, READ_COUNTER_OFFSET) < required_reads {
                std::hint::spin_loop();
            }
        }

        let slot_index = (head as usize) & (self.size - 1);
        let slot_start = HEADER_SIZE + slot_index * SLOT_SIZE;
        let len = payload.len() as u32;
        self.mmap[slot_start..slot_start + 4].copy_from_slice(&len.to_le_bytes());
        self.mmap[slot_start + 4..slot_start + 4 + payload.len()].copy_from_slice(payload);

        atomic_write(&mut self.mmap, HEAD_OFFSET, head + 1);
        Ok(())
    }
}

/// One consumer's view of the ring, tracking its own next slot to read. The
/// mapping is read-write because draining a slot bumps the shared read
/// counter the producer's stall protocol polls.
pub struct ShmConsumer {
    mmap: MmapMut,
    size: usize,
    next_head: u64,
}

impl ShmConsumer {
    /// Opens the ring at `path` and begins reading from slot 0.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ShmError> {
        let file = OpenOptions::new().read(true).write(true).open(path.as_ref())?;
        // SAFETY: the file outlives the mapping and is not truncated while
        // mapped; this consumer reads slot payloads and atomically bumps the
        // shared read counter, which is itself a write into the mapping, so
        // it must be mapped read-write rather than read-only.
        let mmap = unsafe { MmapMut::map_mut(&file)? };
        let total_slots_len = mmap.len() - HEADER_SIZE;
        let size = total_slots_len / SLOT_SIZE;
        Ok(Self {
            mmap,
            size,
            next_head: 0,
        })
    }

    /// Blocks (busy-polling) until the producer has published the next slot,
    /// then returns a copy of its payload and bumps the shared read counter
    /// so the producer may eventually overwrite that slot again.
    pub fn recv(&mut self) -> Vec<u8> {
        while atomic_read(&self.mmap, HEAD_OFFSET) <= self.next_head {
            std::hint::spin_loop();
        }

        let slot_index = (self.next_head as usize) & (self.size - 1);
        let slot_start = HEADER_SIZE + slot_index * SLOT_SIZE;
        let len = u32::from_le_bytes(
            self.mmap[slot_start..slot_start + 4]
                .try_into()
                .expect("4-byte length prefix"),
        ) as usize;
        let payload = self.mmap[slot_start + 4..slot_start + 4 + len].to_vec();

        self.next_head += 1;
        atomic_increment(&self.mmap, READ_COUNTER_OFFSET);
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let file = NamedTempFile::new().unwrap();
        let producer = ShmProducer::create(file.path(), 10).unwrap();
        assert_eq!(producer.capacity(), 16);
    }

    #[test]
    fn single_consumer_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let mut producer = ShmProducer::create(file.path(), 4).unwrap();
        producer.register_consumer();

        let mut consumer = ShmConsumer::open(file.path()).unwrap();

        producer.publish(b"hello").unwrap();
        assert_eq!(consumer.recv(), b"hello".to_vec());

        producer.publish(b"world!").unwrap();
        assert_eq!(consumer.recv(), b"world!".to_vec());
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let mut producer = ShmProducer::create(file.path(), 4).unwrap();
        let big = vec![0u8; SLOT_SIZE];
        assert!(matches!(
            producer.publish(&big),
            Err(ShmError::PayloadTooLarge { .. })
        ));
    }
}
