//! # Content hashes
//!
//! Every object in the store is addressed by a 160-bit SHA-1 digest of a
//! type-tagged header plus its content. This module wraps the raw digest in
//! a small newtype so the rest of the crate never juggles bare `[u8; 20]` or
//! hex strings directly.

use std::fmt;
use std::str::FromStr;

use sha1::{Digest, Sha1};

use crate::error::{CoolCvsError, Result};

/// Number of raw bytes in a digest (SHA-1 is 160 bits).
pub const HASH_LEN: usize = 20;

/// A content hash: the identity of a Blob, Tree or Commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash([u8; HASH_LEN]);

impl Hash {
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a `Hash` from a byte slice, failing if the length is wrong.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; HASH_LEN] = bytes
            .try_into()
            .map_err(|_| CoolCvsError::Corrupt(format!("bad hash length: {}", bytes.len())))?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The two leading hex characters used to shard the object store.
    pub fn shard(&self) -> String {
        hex::encode(&self.0[..1])
    }

    /// The remaining hex characters after the shard prefix.
    pub fn rest(&self) -> String {
        hex::encode(&self.0[1..])
    }

    /// Hash `header || content` where `header` is the object-type tag, e.g.
    /// `"blob #\0"`. Every object kind in this crate identifies itself this
    /// way rather than with a length-prefixed header.
    pub fn digest_tagged(tag: &str, parts: &[&[u8]]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(format!("{tag} #\0").as_bytes());
        for part in parts {
            hasher.update(part);
        }
        let digest = hasher.finalize();
        Self::from_slice(&digest).expect("sha1 digest is always 20 bytes")
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Hash {
    type Err = CoolCvsError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| CoolCvsError::Corrupt(format!("invalid hex hash '{s}': {e}")))?;
        Self::from_slice(&bytes)
    }
}
