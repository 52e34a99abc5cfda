//! # Object types
//!
//! The three object kinds stored in the content-addressed object store:
//!
//! - [`Blob`] — a file's raw bytes, with an empty blob serving as a
//!   deletion tombstone's placeholder content.
//! - [`Tree`] — an insertion-ordered list of (descriptor, child hash)
//!   entries. A commit's tree holds only the delta staged for that commit,
//!   not a full snapshot.
//! - [`Commit`] — a tree hash, an optional parent hash, and a message.
//!
//! [`Descriptor`] is the key type of a tree's children: `(path, kind,
//! removed)`, where a tombstoned and a live descriptor for the same path
//! are distinct keys.

pub mod blob;
pub mod commit;
pub mod descriptor;
pub mod tree;

pub use blob::Blob;
pub use commit::Commit;
pub use descriptor::{Descriptor, Kind};
pub use tree::{Tree, TreeEntry};
