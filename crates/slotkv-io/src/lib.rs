//! # slotkv-io: positioned file I/O abstraction
//!
//! [`FileOps`] is the narrow interface the `slotkv` core consumes for all
//! durability and write-ordering decisions: positioned reads/writes of
//! fixed-width big-endian primitives, plus `len`/`set_len`/`sync`/`close`.
//! [`SyncFileOps`] is the default `std::fs`-backed implementation.

mod backend;
mod error;
mod sync_backend;

#[cfg(feature = "fault-injection")]
mod fault;

pub use backend::FileOps;
pub use error::IoError;
pub use sync_backend::SyncFileOps;

#[cfg(feature = "fault-injection")]
pub use fault::FaultInjectingFileOps;
