//! The fixed 13-byte file header.
//!
//! ```text
//! offset 0   : u8   maxKeyLen     (1..=252)
//! offset 1   : i32  numRecords    (non-negative)
//! offset 5   : i64  dataStartPtr  (= HEADER_SIZE + slotSize * currentSlotCount)
//! ```

use slotkv_io::{FileOps, IoError};

/// Size of the on-disk header in bytes.
pub const HEADER_SIZE: u64 = 13;

const MAX_KEY_LEN_OFFSET: u64 = 0;
const NUM_RECORDS_OFFSET: u64 = 1;
const DATA_START_PTR_OFFSET: u64 = 5;

/// Fields of the file header, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub max_key_len: u8,
    pub num_records: i32,
    pub data_start_ptr: i64,
}

impl Header {
    /// Reads the header from `ops`.
    pub fn read(ops: &mut dyn FileOps) -> Result<Self, IoError> {
        let max_key_len = ops.read_u8(MAX_KEY_LEN_OFFSET)?;
        let num_records = ops.read_i32(NUM_RECORDS_OFFSET)?;
        let data_start_ptr = ops.read_i64(DATA_START_PTR_OFFSET)?;
        Ok(Self {
            max_key_len,
            num_records,
            data_start_ptr,
        })
    }

    /// Writes every field of a fresh header (used only at file creation).
    pub fn write_new(ops: &mut dyn FileOps, self_: Self) -> Result<(), IoError> {
        ops.write_u8(MAX_KEY_LEN_OFFSET, self_.max_key_len)?;
        ops.write_i32(NUM_RECORDS_OFFSET, self_.num_records)?;
        ops.write_i64(DATA_START_PTR_OFFSET, self_.data_start_ptr)?;
        Ok(())
    }

    /// Rewrites `numRecords` alone — the single-word commit for insert/delete.
    pub fn write_num_records(ops: &mut dyn FileOps, n: i32) -> Result<(), IoError> {
        ops.write_i32(NUM_RECORDS_OFFSET, n)
    }

    /// Rewrites `dataStartPtr` alone — the single-word commit for index growth.
    pub fn write_data_start_ptr(ops: &mut dyn FileOps, p: i64) -> Result<(), IoError> {
        ops.write_i64(DATA_START_PTR_OFFSET, p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotkv_io::SyncFileOps;

    #[test]
    fn roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut ops = SyncFileOps::open(&dir.path().join("h.kv"), true).unwrap();
        ops.set_len(HEADER_SIZE).unwrap();

        let header = Header {
            max_key_len: 64,
            num_records: 0,
            data_start_ptr: HEADER_SIZE as i64,
        };
        Header::write_new(&mut ops, header).unwrap();

        assert_eq!(Header::read(&mut ops).unwrap(), header);

        Header::write_num_records(&mut ops, 3).unwrap();
        Header::write_data_start_ptr(&mut ops, 200).unwrap();
        let read_back = Header::read(&mut ops).unwrap();
        assert_eq!(read_back.num_records, 3);
        assert_eq!(read_back.data_start_ptr, 200);
        assert_eq!(read_back.max_key_len, 64);
    }
}
