//! `std::fs`-backed [`FileOps`] implementation.

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::backend::FileOps;
use crate::error::IoError;

/// The default [`FileOps`] backend: a single open `std::fs::File`, accessed
/// through positioned reads/writes (`pread`/`pwrite` on Unix) so the core
/// never needs to track or share a cursor.
#[derive(Debug)]
pub struct SyncFileOps {
    file: Option<File>,
}

impl SyncFileOps {
    /// Opens `path` for reading and writing, creating it if `create` is set.
    pub fn open(path: &Path, create: bool) -> Result<Self, IoError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .open(path)?;
        Ok(Self { file: Some(file) })
    }

    /// Opens `path` for reading only.
    pub fn open_read_only(path: &Path) -> Result<Self, IoError> {
        let file = OpenOptions::new().read(true).open(path)?;
        Ok(Self { file: Some(file) })
    }

    fn file(&self) -> &File {
        self.file.as_ref().expect("file used after close")
    }

    fn file_mut(&mut self) -> &mut File {
        self.file.as_mut().expect("file used after close")
    }
}

impl FileOps for SyncFileOps {
    fn read_exact(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, IoError> {
        let mut buf = vec![0u8; len];

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file().read_exact_at(&mut buf, offset)?;
        }
        #[cfg(not(unix))]
        {
            use std::os::windows::fs::FileExt;
            let mut pos = 0;
            while pos < buf.len() {
                let n = self.file().seek_read(&mut buf[pos..], offset + pos as u64)?;
                if n == 0 {
                    return Err(IoError::ShortRead {
                        offset,
                        wanted: len,
                        got: pos,
                    });
                }
                pos += n;
            }
        }

        Ok(buf)
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) -> Result<(), IoError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            self.file().write_all_at(bytes, offset)?;
        }
        #[cfg(not(unix))]
        {
            use std::os::windows::fs::FileExt;
            let mut pos = 0;
            while pos < bytes.len() {
                let n = self.file().seek_write(&bytes[pos..], offset + pos as u64)?;
                pos += n;
            }
        }
        Ok(())
    }

    fn len(&mut self) -> Result<u64, IoError> {
        Ok(self.file().metadata()?.len())
    }

    fn set_len(&mut self, len: u64) -> Result<(), IoError> {
        self.file_mut().set_len(len)?;
        Ok(())
    }

    fn sync(&mut self) -> Result<(), IoError> {
        self.file().sync_all()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), IoError> {
        self.file = None;
        Ok(())
    }
}
