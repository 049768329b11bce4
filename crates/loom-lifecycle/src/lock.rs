//! Non-blocking advisory exclusive lock on `ephemeral.lock` (spec.md §4.5
//! step 2), folded in here since the teacher's equivalent lockfile crate
//! shipped with no source to adapt.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{LifecycleError, Result};

/// An open, exclusively-locked file. The lock is released when dropped.
pub struct ExclusiveLock {
    _file: File,
    path: PathBuf,
}

impl ExclusiveLock {
    /// Attempts to acquire the lock at `path` without blocking. Returns
    /// `Err(LockHeld)` if another process already holds it.
    pub fn try_acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .map_err(|source| LifecycleError::Io {
                path: path.display().to_string(),
                source,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Self {
                _file: file,
                path: path.to_path_buf(),
            }),
            Err(_) => Err(LifecycleError::LockHeld),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ExclusiveLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self._file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_first_held() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ephemeral.lock");

        let first = ExclusiveLock::try_acquire(&path).unwrap();
        let second = ExclusiveLock::try_acquire(&path);
        assert!(matches!(second, Err(LifecycleError::LockHeld)));
        drop(first);

        let third = ExclusiveLock::try_acquire(&path);
        assert!(third.is_ok());
    }
}
