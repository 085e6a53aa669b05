//! The data region: each occupied record is a length-prefixed payload inside
//! a fixed-capacity slot of data-region bytes.
//!
//! ```text
//! record layout (dataCapacity bytes, as recorded in the index slot):
//!   payloadLen   i32
//!   payload      [u8; payloadLen]
//!   padding      [u8; dataCapacity - 4 - payloadLen]   (unused, untouched)
//! ```
//!
//! The padding is never zeroed or read; `dataCapacity` is the unit of free
//! space accounting. `dataCount` (carried in the index slot) is `4 +
//! payloadLen` — the length prefix plus the payload, i.e. the portion of
//! the capacity actually in use.

use crate::error::StoreError;
use slotkv_io::{FileOps, IoError};

const LEN_PREFIX_SIZE: u64 = 4;

/// Writes `payload` at `data_pointer`, prefixed with its length. Staged
/// before any slot points at it, so a crash mid-write leaves no reachable
/// state pointing here.
pub fn write_payload(ops: &mut dyn FileOps, data_pointer: i64, payload: &[u8]) -> Result<(), IoError> {
    let offset = data_pointer as u64;
    ops.write_i32(offset, payload.len() as i32)?;
    ops.write(offset + LEN_PREFIX_SIZE, payload)
}

/// Reads back the payload at `data_pointer`, first checking that the
/// on-disk length prefix agrees with the index slot's `dataCount` (`key` is
/// only used to name the error). A mismatch means the data region and the
/// index slot have drifted out of sync — corruption, not a user error.
pub fn read_payload(
    ops: &mut dyn FileOps,
    data_pointer: i64,
    data_count: i32,
    key: &[u8],
) -> Result<Vec<u8>, StoreError> {
    let offset = data_pointer as u64;
    let payload_len = ops.read_i32(offset)?;
    if payload_len + 4 != data_count {
        return Err(StoreError::CorruptPayload { key: key.to_vec() });
    }
    Ok(ops.read_exact(offset + LEN_PREFIX_SIZE, payload_len as usize)?)
}
