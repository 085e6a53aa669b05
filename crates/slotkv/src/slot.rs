//! The index region: a fixed-size array of index slots immediately following
//! the header.
//!
//! ```text
//! slot layout (slotSize = maxKeyLen + 25 bytes):
//!   keyLen        u8
//!   key           [u8; maxKeyLen]   (keyLen valid bytes, zero-padded)
//!   dataPointer   i64               (-1 marks an unoccupied slot)
//!   dataCapacity  i32
//!   dataCount     i32
//!   payloadCrc32  u32
//!   slotCrc32     u32               (CRC32 over every byte above)
//! ```

use crate::crc32::crc32;
use crate::error::StoreError;
use crate::header::HEADER_SIZE;
use slotkv_io::{FileOps, IoError};

/// Sentinel `dataPointer` value marking a slot as unoccupied.
pub const FREE_DATA_POINTER: i64 = -1;

/// The decoded contents of one index slot, plus the slot number it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub data_pointer: i64,
    pub data_capacity: i32,
    pub data_count: i32,
    pub payload_crc32: u32,
    pub index_position: u32,
}

impl RecordHeader {
    pub fn is_free(&self) -> bool {
        self.data_pointer == FREE_DATA_POINTER
    }
}

/// Byte width of one index slot for a store with the given `max_key_len`.
pub fn slot_size(max_key_len: u8) -> u64 {
    u64::from(max_key_len) + 25
}

/// Absolute file offset of slot `slot_num`.
pub fn slot_offset(slot_num: u32, max_key_len: u8) -> u64 {
    HEADER_SIZE + u64::from(slot_num) * slot_size(max_key_len)
}

fn encode_fixed_fields(buf: &mut Vec<u8>, key: &[u8], max_key_len: u8, header: &RecordHeader) {
    buf.push(key.len() as u8);
    buf.extend_from_slice(key);
    buf.resize(1 + usize::from(max_key_len), 0);
    buf.extend_from_slice(&header.data_pointer.to_be_bytes());
    buf.extend_from_slice(&header.data_capacity.to_be_bytes());
    buf.extend_from_slice(&header.data_count.to_be_bytes());
    buf.extend_from_slice(&header.payload_crc32.to_be_bytes());
}

/// Writes a fully-populated occupied slot: key, record header, and slot CRC,
/// all in one positioned write. The slot is invalid (CRC mismatch against
/// its prior, stale contents) until this write lands, and valid the instant
/// it does — the encode-then-single-write shape is what lets callers treat
/// a slot as atomically valid-or-rejectable.
pub fn write_slot(
    ops: &mut dyn FileOps,
    slot_num: u32,
    max_key_len: u8,
    key: &[u8],
    header: &RecordHeader,
) -> Result<(), IoError> {
    let mut buf = Vec::with_capacity(usize::from(max_key_len) + 25);
    encode_fixed_fields(&mut buf, key, max_key_len, header);
    let crc = crc32(&buf);
    buf.extend_from_slice(&crc.to_be_bytes());
    ops.write(slot_offset(slot_num, max_key_len), &buf)
}

/// Writes the unoccupied-slot sentinel pattern, with a valid CRC so empty
/// slots are themselves corruption-checked.
pub fn write_empty_slot(ops: &mut dyn FileOps, slot_num: u32, max_key_len: u8) -> Result<(), IoError> {
    let empty = RecordHeader {
        data_pointer: FREE_DATA_POINTER,
        data_capacity: 0,
        data_count: 0,
        payload_crc32: 0,
        index_position: slot_num,
    };
    write_slot(ops, slot_num, max_key_len, &[], &empty)
}

/// Rewrites only the `dataPointer` field of an already-occupied slot,
/// recomputing and rewriting the slot CRC to match in the same write — the
/// new pointer is inert garbage until this lands.
///
/// Used when relocating a record's data during index growth or free-space
/// compaction. The caller supplies the slot's unchanged key and header so
/// the CRC can be recomputed without an extra read.
pub fn rewrite_data_pointer(
    ops: &mut dyn FileOps,
    slot_num: u32,
    max_key_len: u8,
    key: &[u8],
    mut header: RecordHeader,
    new_data_pointer: i64,
) -> Result<(), IoError> {
    header.data_pointer = new_data_pointer;
    write_slot(ops, slot_num, max_key_len, key, &header)
}

/// Reads and validates slot `slot_num`. Returns `Ok(None)` for an unoccupied
/// slot, `Ok(Some(..))` for an occupied one, or `CorruptSlot` if the stored
/// CRC doesn't match the slot's bytes.
pub fn read_slot(
    ops: &mut dyn FileOps,
    slot_num: u32,
    max_key_len: u8,
) -> Result<Option<(Vec<u8>, RecordHeader)>, StoreError> {
    let size = slot_size(max_key_len) as usize;
    let raw = ops.read_exact(slot_offset(slot_num, max_key_len), size)?;

    let body = &raw[..size - 4];
    let stored_crc = u32::from_be_bytes(raw[size - 4..].try_into().unwrap());
    if crc32(body) != stored_crc {
        return Err(StoreError::CorruptSlot(slot_num));
    }

    let key_len = body[0] as usize;
    let key_start = 1;
    let key_end = key_start + usize::from(max_key_len);
    let key = body[key_start..key_start + key_len].to_vec();

    let mut p = key_end;
    let data_pointer = i64::from_be_bytes(body[p..p + 8].try_into().unwrap());
    p += 8;
    let data_capacity = i32::from_be_bytes(body[p..p + 4].try_into().unwrap());
    p += 4;
    let data_count = i32::from_be_bytes(body[p..p + 4].try_into().unwrap());
    p += 4;
    let payload_crc32 = u32::from_be_bytes(body[p..p + 4].try_into().unwrap());

    let header = RecordHeader {
        data_pointer,
        data_capacity,
        data_count,
        payload_crc32,
        index_position: slot_num,
    };

    if header.is_free() {
        Ok(None)
    } else {
        Ok(Some((key, header)))
    }
}
