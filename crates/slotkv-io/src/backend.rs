//! [`FileOps`]: the narrow, positioned-I/O interface the `slotkv` core consumes.
//!
//! All durability and write-ordering decisions in the core are expressed
//! against this trait alone — reads and writes take an explicit byte offset,
//! never an implicit cursor, so the mutation protocol can reason about which
//! bytes reached stable storage independent of call order on the underlying
//! file descriptor.
//!
//! Memory-mapped implementations are a valid choice of backend (they simply
//! need to publish buffer replacement atomically at each call boundary and
//! fail into [`crate::IoError`] on a broken remap); only a `std::fs`-backed
//! implementation ([`SyncFileOps`]) ships here.

use crate::IoError;

/// Positioned, synchronous access to a single file.
///
/// All multi-byte primitives are big-endian. There is no implicit cursor:
/// every read and write names its absolute byte offset.
pub trait FileOps: Send {
    /// Reads exactly `len` bytes starting at `offset`.
    fn read_exact(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, IoError>;

    /// Reads a single big-endian `u8` at `offset`.
    fn read_u8(&mut self, offset: u64) -> Result<u8, IoError> {
        Ok(self.read_exact(offset, 1)?[0])
    }

    /// Reads a big-endian `i32` at `offset`.
    fn read_i32(&mut self, offset: u64) -> Result<i32, IoError> {
        let buf = self.read_exact(offset, 4)?;
        Ok(i32::from_be_bytes(buf.try_into().expect("len 4")))
    }

    /// Reads a big-endian `u32` at `offset`.
    fn read_u32(&mut self, offset: u64) -> Result<u32, IoError> {
        let buf = self.read_exact(offset, 4)?;
        Ok(u32::from_be_bytes(buf.try_into().expect("len 4")))
    }

    /// Reads a big-endian `i64` at `offset`.
    fn read_i64(&mut self, offset: u64) -> Result<i64, IoError> {
        let buf = self.read_exact(offset, 8)?;
        Ok(i64::from_be_bytes(buf.try_into().expect("len 8")))
    }

    /// Writes `bytes` starting at `offset`.
    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), IoError>;

    /// Writes a single big-endian `u8` at `offset`.
    fn write_u8(&mut self, offset: u64, value: u8) -> Result<(), IoError> {
        self.write(offset, &[value])
    }

    /// Writes a big-endian `i32` at `offset`.
    fn write_i32(&mut self, offset: u64, value: i32) -> Result<(), IoError> {
        self.write(offset, &value.to_be_bytes())
    }

    /// Writes a big-endian `u32` at `offset`.
    fn write_u32(&mut self, offset: u64, value: u32) -> Result<(), IoError> {
        self.write(offset, &value.to_be_bytes())
    }

    /// Writes a big-endian `i64` at `offset`.
    fn write_i64(&mut self, offset: u64, value: i64) -> Result<(), IoError> {
        self.write(offset, &value.to_be_bytes())
    }

    /// Returns the current file length in bytes.
    fn len(&mut self) -> Result<u64, IoError>;

    /// Returns `true` if the file is empty.
    fn is_empty(&mut self) -> Result<bool, IoError> {
        Ok(self.len()? == 0)
    }

    /// Truncates or extends the file to exactly `len` bytes.
    fn set_len(&mut self, len: u64) -> Result<(), IoError>;

    /// Flushes file data durably to storage.
    fn sync(&mut self) -> Result<(), IoError>;

    /// Releases the underlying file descriptor. Idempotent.
    fn close(&mut self) -> Result<(), IoError>;
}
