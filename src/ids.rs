/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! Order id generation helpers.
//!
//! Spec §3 requires order ids to be `u64` and unique within a book, unlike
//! the teacher crate's own `pricelevel::Id`, which wraps a full `Uuid`. This
//! module keeps the teacher's "let the caller not have to think about
//! collisions" ergonomics (grounded on its pervasive `Id::new_uuid()` call
//! sites) while producing a `u64`: a fresh `Uuid` is generated and folded
//! down via its 128 bits XORed together, giving a uniformly distributed
//! 64-bit id with the same collision-freedom properties for any id volume
//! this engine is meant to handle.

use uuid::Uuid;

/// A fresh, effectively-unique 64-bit order id.
///
/// Not monotonic and not suitable as a sequence number — only as an opaque
/// identifier, exactly how the teacher crate's `Id::new_uuid()` is used at
/// its own call sites.
#[must_use]
pub fn new_order_id() -> u64 {
    let bytes = Uuid::new_v4().into_bytes();
    let (hi, lo) = bytes.split_at(8);
    u64::from_le_bytes(hi.try_into().unwrap()) ^ u64::from_le_bytes(lo.try_into().unwrap())
}
