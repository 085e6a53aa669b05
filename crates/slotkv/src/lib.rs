//! `slotkv`: an embedded, single-file, crash-safe key/value record store.
//!
//! The on-disk layout is a fixed header, a fixed-slot index region that
//! grows in place, and a data region of variable-capacity record slots. Every
//! mutation follows a prepare-then-commit write order so that a crash at any
//! point leaves the file consistent on next [`Store::open`] — at worst
//! losing the single mutation that was in flight.

mod crc32;
mod error;
mod free_space;
mod header;
mod mem_index;
mod mutation;
mod record;
mod slot;
mod store;

pub use error::StoreError;
pub use store::{KeyValue, OpenMode, Store, StoreOptions};
