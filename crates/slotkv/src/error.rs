//! Error taxonomy for the store: flat variants, not a class hierarchy.

/// Errors returned by [`crate::Store`] operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// `read`/`update`/`delete` against a key that isn't present.
    #[error("key not found")]
    KeyAbsent,

    /// `insert` against a key that's already present.
    #[error("key already exists")]
    KeyExists,

    /// Key longer than the store's configured `max_key_len`.
    #[error("key length {len} exceeds max_key_len {max}")]
    KeyTooLong { len: usize, max: u8 },

    /// An index slot failed its CRC check.
    #[error("index slot {0} failed CRC validation")]
    CorruptSlot(u32),

    /// A payload failed its CRC check on read.
    #[error("payload CRC mismatch for key {key:?}")]
    CorruptPayload { key: Vec<u8> },

    /// The file header or region sizes are not self-consistent.
    #[error("invalid file format: {0}")]
    FormatInvalid(String),

    /// Post-open structural validation of the live record set failed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// An API call was made while the store was not `OPEN`.
    #[error("store is not open")]
    StoreNotOpen,

    /// Underlying file I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] slotkv_io::IoError),
}
