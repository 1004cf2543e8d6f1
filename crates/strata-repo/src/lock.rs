//! Advisory repository lock.
//!
//! Branch pointers, HEAD, and the index files are shared mutable state with
//! no transactional story, so mutating operations serialize through an
//! exclusive lock file. Object writes stay lock-free: they are idempotent,
//! so racing writers of the same content are harmless.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{RepoError, RepoResult};

/// On-disk name of the lock file.
pub const LOCK_FILE: &str = "lock";

/// An acquired repository lock; released on drop.
#[derive(Debug)]
pub struct RepoLock {
    path: PathBuf,
}

impl RepoLock {
    /// Take the exclusive lock under `dir`, failing fast if held.
    ///
    /// `create_new` makes creation atomic; a leftover file from a crashed
    /// process surfaces as [`RepoError::Locked`] with the path to remove.
    pub fn acquire(dir: &Path) -> RepoResult<Self> {
        let path = dir.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                debug!(path = %path.display(), "acquired repository lock");
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(RepoError::Locked(path)),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to release repository lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let _held = RepoLock::acquire(dir.path()).unwrap();
        assert!(matches!(
            RepoLock::acquire(dir.path()),
            Err(RepoError::Locked(_))
        ));
    }

    #[test]
    fn released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _held = RepoLock::acquire(dir.path()).unwrap();
        }
        assert!(RepoLock::acquire(dir.path()).is_ok());
    }
}
