//! Fault-injecting [`FileOps`] decorator, used to drive crash-atomicity tests.
//!
//! Wraps another `FileOps` and fails the `N`th write instead of delegating
//! it, simulating a process that is killed mid-mutation. Every write before
//! the injected failure reaches the inner backend untouched, so replaying a
//! call sequence with an increasing budget explores every write boundary a
//! real crash could land on.

use crate::backend::FileOps;
use crate::error::IoError;

/// Decorates a [`FileOps`] so that the `fail_at`-th write (1-indexed) fails
/// instead of reaching the inner backend. Reads and metadata calls are
/// always delegated.
pub struct FaultInjectingFileOps<F: FileOps> {
    inner: F,
    fail_at: Option<u64>,
    writes_seen: u64,
}

impl<F: FileOps> FaultInjectingFileOps<F> {
    /// Wraps `inner`; no fault is injected until [`Self::set_fail_at`] is called.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            fail_at: None,
            writes_seen: 0,
        }
    }

    /// Arms the decorator to fail the `n`th write (1-indexed) from now on.
    pub fn set_fail_at(&mut self, n: u64) {
        self.fail_at = Some(n);
    }

    /// Returns the number of writes attempted so far (including the failed one).
    pub fn writes_seen(&self) -> u64 {
        self.writes_seen
    }

    fn check_fault(&mut self) -> Result<(), IoError> {
        self.writes_seen += 1;
        if self.fail_at == Some(self.writes_seen) {
            return Err(IoError::Injected {
                write_num: self.writes_seen,
            });
        }
        Ok(())
    }
}

impl<F: FileOps> FileOps for FaultInjectingFileOps<F> {
    fn read_exact(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, IoError> {
        self.inner.read_exact(offset, len)
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), IoError> {
        self.check_fault()?;
        self.inner.write(offset, bytes)
    }

    fn len(&mut self) -> Result<u64, IoError> {
        self.inner.len()
    }

    fn set_len(&mut self, len: u64) -> Result<(), IoError> {
        self.inner.set_len(len)
    }

    fn sync(&mut self) -> Result<(), IoError> {
        self.inner.sync()
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.inner.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyncFileOps;

    #[test]
    fn fails_exactly_the_armed_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.kv");
        let inner = SyncFileOps::open(&path, true).unwrap();
        let mut ops = FaultInjectingFileOps::new(inner);
        ops.set_fail_at(2);

        ops.write(0, b"a").unwrap();
        let err = ops.write(1, b"b").unwrap_err();
        assert!(matches!(err, IoError::Injected { write_num: 2 }));
        // Third write succeeds again (only the armed write fails).
        ops.write(2, b"c").unwrap();
    }
}
