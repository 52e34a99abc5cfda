//! # Object and reference store
//!
//! Two flavors of key live under the repository's sentinel directory:
//! content-addressed object keys, sharded by the first two hex characters
//! of their hash, and named reference keys (branch names, tag names, the
//! literal name `HEAD`), stored as flat files.
//!
//! Writes are plain synchronous filesystem calls — no journaling, no
//! fsync discipline beyond what the OS gives a single `write`. Crash
//! consistency across a whole commit operation is not provided; only
//! write ordering within one operation is guaranteed by call order in
//! `index`/`history`/`rebase`.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::{CoolCvsError, Result};
use crate::hash::Hash;

/// Content-addressed object store rooted at `<cvs_dir>/objects`.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn shard_dir(&self, hash: &Hash) -> PathBuf {
        self.root.join(hash.shard())
    }

    fn object_path(&self, hash: &Hash) -> PathBuf {
        self.shard_dir(hash).join(hash.rest())
    }

    /// Write `bytes` under `hash`. Idempotent: re-writing the same hash is
    /// a no-op in outcome (objects are immutable, so the existing file is
    /// trusted rather than re-written).
    pub fn put_object(&self, hash: &Hash, bytes: &[u8]) -> Result<()> {
        let path = self.object_path(hash);
        if path.exists() {
            debug!("object {} already present, skipping write", hash);
            return Ok(());
        }
        std::fs::create_dir_all(self.shard_dir(hash))?;
        std::fs::write(&path, bytes)?;
        debug!("wrote object {} ({} bytes)", hash, bytes.len());
        Ok(())
    }

    pub fn get_object(&self, hash: &Hash) -> Result<Vec<u8>> {
        let path = self.object_path(hash);
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CoolCvsError::NotFound(format!("object {hash} not found"))
            }
            _ => CoolCvsError::Io(e),
        })
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.object_path(hash).exists()
    }
}

/// Flat named-reference store: branch files, tag files, and `HEAD`.
#[derive(Debug, Clone)]
pub struct RefStore {
    root: PathBuf,
}

impl RefStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path(&self, dir: &str, name: &str) -> PathBuf {
        if dir.is_empty() {
            self.root.join(name)
        } else {
            self.root.join(dir).join(name)
        }
    }

    pub fn put_ref(&self, dir: &str, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(dir, name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        info!("wrote ref {}/{}", dir, name);
        Ok(())
    }

    pub fn get_ref(&self, dir: &str, name: &str) -> Result<Vec<u8>> {
        let path = self.path(dir, name);
        std::fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CoolCvsError::NotFound(format!("ref {dir}/{name} not found"))
            }
            _ => CoolCvsError::Io(e),
        })
    }

    pub fn delete_ref(&self, dir: &str, name: &str) -> Result<()> {
        let path = self.path(dir, name);
        std::fs::remove_file(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CoolCvsError::NotFound(format!("ref {dir}/{name} not found"))
            }
            _ => CoolCvsError::Io(e),
        })?;
        info!("deleted ref {}/{}", dir, name);
        Ok(())
    }

    pub fn ref_exists(&self, dir: &str, name: &str) -> bool {
        self.path(dir, name).exists()
    }

    /// List the names stored flat under `dir`, sorted.
    pub fn list(&self, dir: &str) -> Result<Vec<String>> {
        let path = if dir.is_empty() {
            self.root.clone()
        } else {
            self.root.join(dir)
        };
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&path)? {
            let entry = entry?;
            if entry.path().is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_object_roundtrips() {
        let temp = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(temp.path().to_path_buf());
        let hash = Hash::digest_tagged("blob", &[b"hello"]);

        store.put_object(&hash, b"hello").unwrap();
        assert_eq!(store.get_object(&hash).unwrap(), b"hello");
    }

    #[test]
    fn get_missing_object_is_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(temp.path().to_path_buf());
        let hash = Hash::digest_tagged("blob", &[b"missing"]);

        let err = store.get_object(&hash).unwrap_err();
        assert!(matches!(err, CoolCvsError::NotFound(_)));
    }

    #[test]
    fn put_object_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(temp.path().to_path_buf());
        let hash = Hash::digest_tagged("blob", &[b"x"]);

        store.put_object(&hash, b"x").unwrap();
        store.put_object(&hash, b"x").unwrap();
        assert_eq!(store.get_object(&hash).unwrap(), b"x");
    }

    #[test]
    fn ref_roundtrip_and_delete() {
        let temp = tempfile::tempdir().unwrap();
        let refs = RefStore::new(temp.path().to_path_buf());

        refs.put_ref("heads", "main", b"deadbeef").unwrap();
        assert_eq!(refs.get_ref("heads", "main").unwrap(), b"deadbeef");
        assert!(refs.ref_exists("heads", "main"));

        refs.delete_ref("heads", "main").unwrap();
        assert!(!refs.ref_exists("heads", "main"));
    }

    #[test]
    fn list_refs_is_sorted() {
        let temp = tempfile::tempdir().unwrap();
        let refs = RefStore::new(temp.path().to_path_buf());

        refs.put_ref("heads", "zeta", b"1").unwrap();
        refs.put_ref("heads", "alpha", b"2").unwrap();

        assert_eq!(refs.list("heads").unwrap(), vec!["alpha", "zeta"]);
    }
}
