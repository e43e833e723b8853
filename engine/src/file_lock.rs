//! Whole-file advisory locking for the table files the generator appends to.
//!
//! This is a thin portability shim over `fs2`; the interesting contract
//! (what must happen while the lock is held) lives in [`crate::generator`].

use std::fs::File;

use fs2::FileExt;

use rainbow_core::RainbowResult;

/// An exclusive, whole-file advisory lock, released on drop.
pub struct ExclusiveFileLock<'a> {
    file: &'a File,
}

impl<'a> ExclusiveFileLock<'a> {
    /// Blocks until an exclusive lock on `file` is acquired.
    pub fn acquire(file: &'a File) -> RainbowResult<Self> {
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for ExclusiveFileLock<'_> {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn lock_is_released_on_drop() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello").unwrap();
        let file = tmp.reopen().unwrap();

        {
            let _lock = ExclusiveFileLock::acquire(&file).unwrap();
        }

        // A second acquisition must succeed now that the first was dropped.
        let lock2 = ExclusiveFileLock::acquire(&file);
        assert!(lock2.is_ok());
    }
}
