//! # Tree object
//!
//! A tree is an insertion-ordered list of (descriptor, child hash) entries.
//! Order matters: it is preserved across a serialize/deserialize round trip
//! and is exactly what the tree's hash depends on.
//!
//! A commit's tree stores only the *deltas* staged for that commit, not a
//! full directory snapshot — the full living set of files at a commit is
//! reconstructed by folding ancestry (`history::expand_full_tree`).
//!
//! ## Identity
//!
//! `hash = SHA1("tree #\0" || concat(child_hash for each child in order))`.
//! This depends only on the sequence of child hashes, not on the paths or
//! kinds of the descriptors that reference them.

use crate::error::{CoolCvsError, Result};
use crate::hash::{Hash, HASH_LEN};
use crate::objects::descriptor::{Descriptor, Kind};

/// A single entry: a descriptor plus the hash of the object it points at.
/// The hash is absent for a tombstoned entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub descriptor: Descriptor,
    pub hash: Option<Hash>,
}

impl TreeEntry {
    pub fn new(descriptor: Descriptor, hash: Option<Hash>) -> Self {
        Self { descriptor, hash }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    pub children: Vec<TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child, replacing any existing entry with the identical
    /// descriptor (same path, kind *and* removed flag) in place so
    /// re-staging a path doesn't duplicate its key.
    pub fn add_entry(&mut self, descriptor: Descriptor, hash: Option<Hash>) {
        if let Some(existing) = self
            .children
            .iter_mut()
            .find(|e| e.descriptor == descriptor)
        {
            existing.hash = hash;
        } else {
            self.children.push(TreeEntry::new(descriptor, hash));
        }
    }

    pub fn get(&self, descriptor: &Descriptor) -> Option<&TreeEntry> {
        self.children.iter().find(|e| &e.descriptor == descriptor)
    }

    pub fn contains(&self, descriptor: &Descriptor) -> bool {
        self.get(descriptor).is_some()
    }

    pub fn hash(&self) -> Hash {
        let parts: Vec<&[u8]> = self
            .children
            .iter()
            .map(|e| match &e.hash {
                Some(h) => &h.as_bytes()[..],
                None => &[][..],
            })
            .collect();
        Hash::digest_tagged("tree", &parts)
    }

    /// Serialize in insertion order: per entry, `u32 path_len | path | u8
    /// kind | u8 removed | u32 hash_len | hash`.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.children {
            let path_bytes = entry.descriptor.path.as_bytes();
            out.extend_from_slice(&(path_bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(path_bytes);
            out.push(match entry.descriptor.kind {
                Kind::Blob => 0,
                Kind::Tree => 1,
            });
            out.push(entry.descriptor.removed as u8);
            match &entry.hash {
                Some(h) => {
                    out.extend_from_slice(&(HASH_LEN as u32).to_le_bytes());
                    out.extend_from_slice(h.as_bytes());
                }
                None => out.extend_from_slice(&0u32.to_le_bytes()),
            }
        }
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut pos = 0usize;
        let mut children = Vec::new();

        while pos < bytes.len() {
            let path_len = read_u32(bytes, &mut pos)? as usize;
            let path = read_str(bytes, &mut pos, path_len)?;

            let kind = match read_u8(bytes, &mut pos)? {
                0 => Kind::Blob,
                1 => Kind::Tree,
                other => {
                    return Err(CoolCvsError::Corrupt(format!(
                        "invalid tree entry kind tag: {other}"
                    )))
                }
            };
            let removed = read_u8(bytes, &mut pos)? != 0;

            let hash_len = read_u32(bytes, &mut pos)? as usize;
            let hash = if hash_len == 0 {
                None
            } else {
                let hash_bytes = read_bytes(bytes, &mut pos, hash_len)?;
                Some(Hash::from_slice(hash_bytes)?)
            };

            children.push(TreeEntry::new(Descriptor::new(path, kind, removed), hash));
        }

        Ok(Self { children })
    }
}

fn read_u32(bytes: &[u8], pos: &mut usize) -> Result<u32> {
    let slice = read_bytes(bytes, pos, 4)?;
    Ok(u32::from_le_bytes(slice.try_into().unwrap()))
}

fn read_u8(bytes: &[u8], pos: &mut usize) -> Result<u8> {
    let slice = read_bytes(bytes, pos, 1)?;
    Ok(slice[0])
}

fn read_bytes<'a>(bytes: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    if *pos + len > bytes.len() {
        return Err(CoolCvsError::Corrupt("truncated tree entry".into()));
    }
    let slice = &bytes[*pos..*pos + len];
    *pos += len;
    Ok(slice)
}

fn read_str(bytes: &[u8], pos: &mut usize, len: usize) -> Result<String> {
    let slice = read_bytes(bytes, pos, len)?;
    String::from_utf8(slice.to_vec())
        .map_err(|e| CoolCvsError::Corrupt(format!("invalid utf-8 path: {e}")))
}
