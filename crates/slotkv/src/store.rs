//! The `Store` facade: file lifecycle, state-machine enforcement, and the
//! public API. Mutation algorithms live in [`crate::mutation`].

use crate::header::{Header, HEADER_SIZE};
use crate::mem_index::MemIndex;
use crate::slot::{self, slot_size};
use crate::StoreError;
use slotkv_io::{FileOps, SyncFileOps};
use std::path::Path;
use tracing::{debug, info};

/// A key/value pair as returned by [`Store::snapshot`].
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// How [`Store::open`] should treat a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Create a new file with the given [`StoreOptions`] if none exists;
    /// otherwise open the existing file read-write.
    CreateOrOpenReadWrite,
    /// Open an existing file read-write. Errors if it doesn't exist.
    OpenReadWrite,
    /// Open an existing file for reads only; mutating calls fail at the I/O
    /// layer once the OS rejects the write.
    OpenReadOnly,
}

/// Parameters used only when a new file is created.
#[derive(Debug, Clone, Copy)]
pub struct StoreOptions {
    /// Maximum key length this store will ever accept, 1..=252. Fixed for
    /// the life of the file; see `slotkv-cli expand` to change it offline.
    pub max_key_len: u8,
    /// Number of index slots to preallocate at creation.
    pub preallocated_slots: u32,
    /// Whether payload bytes are covered by a CRC32, checked on every read.
    pub payload_crc_enabled: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_key_len: 64,
            preallocated_slots: 16,
            payload_crc_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreState {
    Open,
    Closed,
}

/// An open handle to a single-file key/value store.
pub struct Store<F: FileOps = SyncFileOps> {
    pub(crate) ops: F,
    pub(crate) state: StoreState,
    pub(crate) max_key_len: u8,
    pub(crate) payload_crc_enabled: bool,
    pub(crate) num_records: i32,
    pub(crate) data_start_ptr: i64,
    pub(crate) total_slots: u32,
    pub(crate) index: MemIndex,
}

impl Store<SyncFileOps> {
    /// Opens (or creates) a store at `path` backed by a plain OS file.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, options: StoreOptions) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let exists = path.exists();

        let ops = match mode {
            OpenMode::CreateOrOpenReadWrite => SyncFileOps::open(path, !exists)?,
            OpenMode::OpenReadWrite => {
                if !exists {
                    return Err(StoreError::FormatInvalid(format!(
                        "{} does not exist",
                        path.display()
                    )));
                }
                SyncFileOps::open(path, false)?
            }
            OpenMode::OpenReadOnly => {
                if !exists {
                    return Err(StoreError::FormatInvalid(format!(
                        "{} does not exist",
                        path.display()
                    )));
                }
                SyncFileOps::open_read_only(path)?
            }
        };

        let should_create = matches!(mode, OpenMode::CreateOrOpenReadWrite) && !exists;
        Self::open_with(ops, should_create, options)
    }
}

impl<F: FileOps> Store<F> {
    /// Opens a store over an already-constructed [`FileOps`] backend, e.g.
    /// a [`slotkv_io::FaultInjectingFileOps`] wrapper in tests.
    pub fn open_with(mut ops: F, create: bool, options: StoreOptions) -> Result<Self, StoreError> {
        if create {
            Self::initialize(&mut ops, options)?;
        }

        let header = Header::read(&mut ops)?;
        if header.max_key_len == 0 {
            return Err(StoreError::FormatInvalid("maxKeyLen is zero".into()));
        }
        if header.num_records < 0 {
            return Err(StoreError::FormatInvalid("numRecords is negative".into()));
        }
        if header.data_start_ptr < HEADER_SIZE as i64 {
            return Err(StoreError::FormatInvalid("dataStartPtr precedes header".into()));
        }

        let slot_width = slot_size(header.max_key_len);
        let index_bytes = header.data_start_ptr as u64 - HEADER_SIZE;
        if !index_bytes.is_multiple_of(slot_width) {
            return Err(StoreError::FormatInvalid(
                "dataStartPtr is not slot-aligned".into(),
            ));
        }
        let total_slots = (index_bytes / slot_width) as u32;
        if i64::from(header.num_records) > i64::from(total_slots) {
            return Err(StoreError::FormatInvalid(
                "numRecords exceeds the slots the index region can hold".into(),
            ));
        }

        // Only slots 0..numRecords are live; slots at or beyond numRecords
        // may carry stale bytes from an aborted insert and are never read.
        let mut index = MemIndex::new();
        for slot_num in 0..header.num_records as u32 {
            match slot::read_slot(&mut ops, slot_num, header.max_key_len)? {
                Some((key, record_header)) => index.insert(key, record_header),
                None => {
                    return Err(StoreError::InvariantViolation(format!(
                        "slot {slot_num} is within the live range but unoccupied"
                    )));
                }
            };
        }

        let file_len = ops.len()?;
        let mut prev_end: Option<i64> = None;
        for (ptr, record_header) in index.iter_by_pointer() {
            if ptr < header.data_start_ptr {
                return Err(StoreError::InvariantViolation(format!(
                    "record at {ptr} precedes dataStartPtr {}",
                    header.data_start_ptr
                )));
            }
            let end = ptr + i64::from(record_header.data_capacity);
            if end > file_len as i64 {
                return Err(StoreError::InvariantViolation(format!(
                    "record at {ptr} extends past end of file"
                )));
            }
            if let Some(prev_end) = prev_end
                && ptr < prev_end
            {
                return Err(StoreError::InvariantViolation(format!(
                    "record at {ptr} overlaps previous record ending at {prev_end}"
                )));
            }
            prev_end = Some(end);
        }

        info!(num_records = header.num_records, total_slots, "store opened");

        Ok(Self {
            ops,
            state: StoreState::Open,
            max_key_len: header.max_key_len,
            payload_crc_enabled: options.payload_crc_enabled,
            num_records: header.num_records,
            data_start_ptr: header.data_start_ptr,
            total_slots,
            index,
        })
    }

    fn initialize(ops: &mut F, options: StoreOptions) -> Result<(), StoreError> {
        if options.max_key_len == 0 {
            return Err(StoreError::FormatInvalid("max_key_len must be >= 1".into()));
        }
        let slot_width = slot_size(options.max_key_len);
        let data_start_ptr = HEADER_SIZE as i64 + (u64::from(options.preallocated_slots) * slot_width) as i64;

        ops.set_len(data_start_ptr as u64)?;
        Header::write_new(
            ops,
            Header {
                max_key_len: options.max_key_len,
                num_records: 0,
                data_start_ptr,
            },
        )?;
        for slot_num in 0..options.preallocated_slots {
            slot::write_empty_slot(ops, slot_num, options.max_key_len)?;
        }
        ops.sync()?;
        debug!(
            max_key_len = options.max_key_len,
            preallocated_slots = options.preallocated_slots,
            "initialized new store file"
        );
        Ok(())
    }

    pub(crate) fn ensure_open(&self) -> Result<(), StoreError> {
        if self.state == StoreState::Open {
            Ok(())
        } else {
            Err(StoreError::StoreNotOpen)
        }
    }

    pub(crate) fn check_key_len(&self, key: &[u8]) -> Result<(), StoreError> {
        if key.len() > usize::from(self.max_key_len) {
            Err(StoreError::KeyTooLong {
                len: key.len(),
                max: self.max_key_len,
            })
        } else {
            Ok(())
        }
    }

    /// Number of records currently stored.
    pub fn len(&self) -> Result<usize, StoreError> {
        self.ensure_open()?;
        Ok(self.index.len())
    }

    /// `true` if the store has no records.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(self.index.is_empty())
    }

    /// `true` if `key` is present.
    pub fn exists(&self, key: &[u8]) -> Result<bool, StoreError> {
        self.ensure_open()?;
        Ok(self.index.contains(key))
    }

    /// All keys currently stored, in no particular order.
    pub fn keys(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        self.ensure_open()?;
        Ok(self.index.keys().cloned().collect())
    }

    /// The fixed maximum key length this store accepts.
    pub fn max_key_len(&self) -> u8 {
        self.max_key_len
    }

    /// Number of index slots currently allocated (occupied + free).
    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    /// The key occupying index slot `slot_num`, if the store is that large
    /// and the slot is occupied. Diagnostic use only (`slotkv-cli inspect`).
    pub fn slot_key(&self, slot_num: u32) -> Result<Option<Vec<u8>>, StoreError> {
        self.ensure_open()?;
        Ok(self.index.key_at_slot(slot_num).cloned())
    }

    /// The `[lowest dataPointer, highest dataPointer + dataCapacity)` span
    /// currently occupied by live records, if any.
    pub fn data_region_span(&self) -> Result<Option<(i64, i64)>, StoreError> {
        self.ensure_open()?;
        let Some((first_ptr, _)) = self.index.first_by_pointer() else {
            return Ok(None);
        };
        let (last_ptr, last_header) = self.index.last_by_pointer().expect("first_by_pointer succeeded");
        Ok(Some((first_ptr, last_ptr + i64::from(last_header.data_capacity))))
    }

    /// Flushes all prior writes durably to storage.
    pub fn fsync(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.ops.sync()?;
        Ok(())
    }

    /// Closes the store. Idempotent: calling this on an already-closed
    /// store is a no-op.
    pub fn close(&mut self) -> Result<(), StoreError> {
        if self.state == StoreState::Closed {
            return Ok(());
        }
        self.ops.sync()?;
        self.ops.close()?;
        self.state = StoreState::Closed;
        info!("store closed");
        Ok(())
    }

    /// A consistent point-in-time copy of every key/value pair.
    pub fn snapshot(&mut self) -> Result<Vec<KeyValue>, StoreError> {
        self.ensure_open()?;
        let keys: Vec<Vec<u8>> = self.index.keys().cloned().collect();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let value = self.read(&key)?;
            out.push((key, value));
        }
        Ok(out)
    }
}

impl<F: FileOps> Drop for Store<F> {
    fn drop(&mut self) {
        if self.state == StoreState::Open {
            let _ = self.ops.sync();
        }
    }
}
