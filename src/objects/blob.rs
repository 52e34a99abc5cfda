//! # Blob object
//!
//! A blob stores a file's raw bytes. It carries no filename or permissions
//! of its own — that lives on the descriptor that points at it from a tree.
//!
//! ## Identity
//!
//! `hash = SHA1("blob #\0" || content)`. A deleted file's tombstone is an
//! *empty* blob referenced by a tombstoned descriptor rather than a
//! distinct kind of blob.

use crate::hash::Hash;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub content: Vec<u8>,
}

impl Blob {
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }

    /// The tombstone placeholder written for descriptors marked
    /// `removed = true`.
    pub fn tombstone() -> Self {
        Self { content: Vec::new() }
    }

    pub fn from_file(path: &std::path::Path) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }

    pub fn hash(&self) -> Hash {
        Hash::digest_tagged("blob", &[&self.content])
    }

    /// Blobs are stored as-is on disk: serialization is the identity
    /// function.
    pub fn serialize(&self) -> Vec<u8> {
        self.content.clone()
    }

    pub fn deserialize(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    pub fn as_text(&self) -> Option<String> {
        String::from_utf8(self.content.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_pure_function_of_content() {
        let a = Blob::new(b"same bytes".to_vec());
        let b = Blob::new(b"same bytes".to_vec());
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn roundtrip_preserves_content() {
        let blob = Blob::new(b"roundtrip me".to_vec());
        let restored = Blob::deserialize(&blob.serialize());
        assert_eq!(restored.content, blob.content);
    }

    #[test]
    fn different_content_differs() {
        let a = Blob::new(b"a".to_vec());
        let b = Blob::new(b"b".to_vec());
        assert_ne!(a.hash(), b.hash());
    }
}
