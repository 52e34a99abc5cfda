//! # Commit object
//!
//! A commit points at a tree of staged deltas and, except for the very
//! first commit in a repository, at exactly one parent commit. There is no
//! merge commit: rebase replays source commits one at a time onto the
//! destination, producing a linear history.
//!
//! ## Identity
//!
//! `hash = SHA1("commit #\0" || tree.hash || parent_hash_bytes)`, where
//! `parent_hash_bytes` is empty for the initial commit. The commit message
//! is deliberately excluded from identity — two commits with the same tree
//! and parent but different messages are the same commit.

use crate::error::{CoolCvsError, Result};
use crate::hash::{Hash, HASH_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub tree: Hash,
    pub parent: Option<Hash>,
    pub message: String,
}

impl Commit {
    pub fn new(tree: Hash, parent: Option<Hash>, message: impl Into<String>) -> Self {
        Self {
            tree,
            parent,
            message: message.into(),
        }
    }

    pub fn is_initial(&self) -> bool {
        self.parent.is_none()
    }

    pub fn hash(&self) -> Hash {
        match &self.parent {
            Some(parent) => Hash::digest_tagged("commit", &[self.tree.as_bytes(), parent.as_bytes()]),
            None => Hash::digest_tagged("commit", &[self.tree.as_bytes()]),
        }
    }

    /// `u32 tree_hash_len | tree hash | u32 parent_len(0 or 20) | parent
    /// hash | u32 message_len | message bytes`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();

        out.extend_from_slice(&(HASH_LEN as u32).to_le_bytes());
        out.extend_from_slice(self.tree.as_bytes());

        match &self.parent {
            Some(parent) => {
                out.extend_from_slice(&(HASH_LEN as u32).to_le_bytes());
                out.extend_from_slice(parent.as_bytes());
            }
            None => out.extend_from_slice(&0u32.to_le_bytes()),
        }

        let message_bytes = self.message.as_bytes();
        out.extend_from_slice(&(message_bytes.len() as u32).to_le_bytes());
        out.extend_from_slice(message_bytes);

        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut pos = 0usize;

        let tree_len = read_u32(bytes, &mut pos)? as usize;
        let tree_bytes = read_bytes(bytes, &mut pos, tree_len)?;
        let tree = Hash::from_slice(tree_bytes)?;

        let parent_len = read_u32(bytes, &mut pos)? as usize;
        let parent = if parent_len == 0 {
            None
        } else {
            let parent_bytes = read_bytes(bytes, &mut pos, parent_len)?;
            Some(Hash::from_slice(parent_bytes)?)
        };

        let message_len = read_u32(bytes, &mut pos)? as usize;
        let message_bytes = read_bytes(bytes, &mut pos, message_len)?;
        let message = String::from_utf8(message_bytes.to_vec())
            .map_err(|e| CoolCvsError::Corrupt(format!("invalid utf-8 commit message: {e}")))?;

        Ok(Self { tree, parent, message })
    }
}

fn read_u32(bytes: &[u8], pos: &mut usize) -> Result<u32> {
    let slice = read_bytes(bytes, pos, 4)?;
    Ok(u32::from_le_bytes(slice.try_into().unwrap()))
}

fn read_bytes<'a>(bytes: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    if *pos + len > bytes.len() {
        return Err(CoolCvsError::Corrupt("truncated commit".into()));
    }
    let slice = &bytes[*pos..*pos + len];
    *pos += len;
    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::tree::Tree;

    fn tree_hash(tag: &str) -> Hash {
        let mut tree = Tree::new();
        tree.add_entry(crate::objects::descriptor::Descriptor::blob(tag, false), None);
        tree.hash()
    }

    #[test]
    fn initial_commit_has_no_parent() {
        let commit = Commit::new(tree_hash("a"), None, "init");
        assert!(commit.is_initial());
    }

    #[test]
    fn hash_excludes_message() {
        let tree = tree_hash("a");
        let a = Commit::new(tree, None, "message one");
        let b = Commit::new(tree, None, "message two");
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn hash_depends_on_parent() {
        let tree = tree_hash("a");
        let parent = Commit::new(tree_hash("b"), None, "parent").hash();
        let without_parent = Commit::new(tree, None, "m");
        let with_parent = Commit::new(tree, Some(parent), "m");
        assert_ne!(without_parent.hash(), with_parent.hash());
    }

    #[test]
    fn roundtrip_preserves_fields() {
        let tree = tree_hash("a");
        let parent = Commit::new(tree_hash("b"), None, "parent").hash();
        let commit = Commit::new(tree, Some(parent), "hello world");

        let restored = Commit::deserialize(&commit.serialize()).unwrap();
        assert_eq!(restored, commit);
    }

    #[test]
    fn roundtrip_handles_missing_parent() {
        let commit = Commit::new(tree_hash("a"), None, "init");
        let restored = Commit::deserialize(&commit.serialize()).unwrap();
        assert_eq!(restored, commit);
    }
}
