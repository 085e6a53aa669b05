//! I/O error type.

/// Errors from a [`crate::FileOps`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Underlying OS I/O error.
    #[error("I/O error: {source}")]
    Os {
        #[from]
        source: std::io::Error,
    },

    /// A positioned read returned fewer bytes than requested (short file).
    #[error("short read at offset {offset}: wanted {wanted} bytes, got {got}")]
    ShortRead {
        offset: u64,
        wanted: usize,
        got: usize,
    },

    /// Fault injected by [`crate::fault::FaultInjectingFileOps`] in tests.
    #[cfg(feature = "fault-injection")]
    #[error("injected fault on write #{write_num}")]
    Injected { write_num: u64 },
}
