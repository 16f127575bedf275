/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Length-delimited wire codec for the snapshot subscription interface,
//! spec §6 "Snapshot wire format": "a length-prefixed structured record
//! (length-delimited, little-endian u32 length) ... Implementations must be
//! wire-compatible across producers and consumers."
//!
//! Grounded on the teacher crate's own `wire`/`bincode` feature (its
//! `BincodeEventSerializer`) and `sequencer/journal.rs`'s
//! `ENTRY_HEADER_SIZE`/length-prefix constants idiom, repurposed here from
//! event-journal framing to snapshot framing: every frame is `u32` (little
//! endian) length prefix followed by that many bytes of `bincode`-encoded
//! [`Snapshot`].

use crate::book::snapshot::Snapshot;
use std::fmt;
use std::io::{self, Read, Write};

/// Maximum accepted frame payload size: spec §6's multicast datagram cap
/// (64 KiB) also bounds a single snapshot frame, since multicast egress and
/// the subscription wire format carry the same payload.
pub const MAX_FRAME_LEN: u32 = 64 * 1024;

/// Errors encoding or decoding a wire frame.
#[derive(Debug)]
pub enum WireError {
    /// Underlying I/O failure reading/writing the stream.
    Io(io::Error),
    /// `bincode` (de)serialization failed.
    Codec(String),
    /// The declared frame length exceeded [`MAX_FRAME_LEN`].
    FrameTooLarge(u32),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Io(e) => write!(f, "wire I/O error: {e}"),
            WireError::Codec(msg) => write!(f, "wire codec error: {msg}"),
            WireError::FrameTooLarge(len) => {
                write!(f, "wire frame length {len} exceeds max {MAX_FRAME_LEN}")
            }
        }
    }
}

impl std::error::Error for WireError {}

impl From<io::Error> for WireError {
    fn from(e: io::Error) -> Self {
        WireError::Io(e)
    }
}

/// Encodes `snapshot` as a single length-prefixed frame: `u32` little-endian
/// byte length, followed by the `bincode`-encoded payload.
pub fn encode_frame(snapshot: &Snapshot) -> Result<Vec<u8>, WireError> {
    let payload = bincode::serde::encode_to_vec(snapshot, bincode::config::standard())
        .map_err(|e| WireError::Codec(e.to_string()))?;
    let len: u32 = payload
        .len()
        .try_into()
        .map_err(|_| WireError::FrameTooLarge(u32::MAX))?;
    if len > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge(len));
    }
    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&len.to_le_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Writes one length-prefixed frame for `snapshot` to `writer`.
pub fn write_frame<W: Write>(writer: &mut W, snapshot: &Snapshot) -> Result<(), WireError> {
    let frame = encode_frame(snapshot)?;
    writer.write_all(&frame)?;
    Ok(())
}

/// Reads one length-prefixed frame from `reader` and decodes it as a
/// [`Snapshot`]. Returns `Ok(None)` on a clean EOF before any bytes of the
/// next frame's length prefix are read.
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Snapshot>, WireError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(WireError::Io(e)),
    }
    let len = u32::from_le_bytes(len_buf);
    if len > MAX_FRAME_LEN {
        return Err(WireError::FrameTooLarge(len));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    let (snapshot, _) =
        bincode::serde::decode_from_slice(&payload, bincode::config::standard())
            .map_err(|e| WireError::Codec(e.to_string()))?;
    Ok(Some(snapshot))
}
