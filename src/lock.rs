//! # Advisory repository lock
//!
//! Cross-process coordination is optional hardening here, not a
//! required contract: an advisory lock file at the repository root,
//! acquired for the duration of any mutating operation, best-effort and
//! not enforced against a process that ignores it.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{CoolCvsError, Result};

/// Held for the lifetime of a mutating `Repository` operation; removes
/// its lock file on drop.
pub struct RepoLock {
    path: PathBuf,
}

impl RepoLock {
    pub fn acquire(cvs_dir: &Path) -> Result<Self> {
        let path = cvs_dir.join("lock");
        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(_) => {
                debug!("acquired advisory lock at {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(CoolCvsError::InvalidState(format!(
                    "repository is locked (stale lock file at {})",
                    path.display()
                )))
            }
            Err(e) => Err(CoolCvsError::Io(e)),
        }
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("failed to release advisory lock {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_first_is_held() {
        let temp = tempfile::tempdir().unwrap();
        let first = RepoLock::acquire(temp.path()).unwrap();
        assert!(RepoLock::acquire(temp.path()).is_err());
        drop(first);
        assert!(RepoLock::acquire(temp.path()).is_ok());
    }
}
