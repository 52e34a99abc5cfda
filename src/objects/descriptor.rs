//! # Descriptors
//!
//! A [`Descriptor`] is the key type of a tree's children: `(path, kind,
//! removed)`. Two descriptors that differ only in `removed` are distinct
//! keys — a tombstone and a live entry for the same path coexist as
//! separate map entries, which is how tombstone-killing during ancestry
//! folding (see `history::expand_full_tree`) tells "this path used to live
//! here" apart from "this path lives here".

use std::fmt;

/// What kind of object a descriptor's child hash refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Blob,
    Tree,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Blob => write!(f, "blob"),
            Kind::Tree => write!(f, "tree"),
        }
    }
}

/// `(path, kind, removed)` — the key type of a [`crate::objects::Tree`]'s
/// children.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Descriptor {
    pub path: String,
    pub kind: Kind,
    pub removed: bool,
}

impl Descriptor {
    pub fn new(path: impl Into<String>, kind: Kind, removed: bool) -> Self {
        Self {
            path: path.into(),
            kind,
            removed,
        }
    }

    pub fn blob(path: impl Into<String>, removed: bool) -> Self {
        Self::new(path, Kind::Blob, removed)
    }

    pub fn tree(path: impl Into<String>, removed: bool) -> Self {
        Self::new(path, Kind::Tree, removed)
    }

    /// This same path/kind, but tombstoned. Used to check whether a live
    /// entry has been killed by a later commit.
    pub fn as_removed(&self) -> Descriptor {
        Descriptor::new(self.path.clone(), self.kind, true)
    }

    /// This same path/kind, but live. Used to check whether a path is
    /// already shadowed by a newer commit.
    pub fn as_live(&self) -> Descriptor {
        Descriptor::new(self.path.clone(), self.kind, false)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.removed {
            write!(f, "{} ({}, removed)", self.path, self.kind)
        } else {
            write!(f, "{} ({})", self.path, self.kind)
        }
    }
}
