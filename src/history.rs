//! # History engine
//!
//! Walks commit ancestry and folds per-commit tree deltas and tombstones
//! into the "full tree state" at a commit, and restores a working
//! directory from that state.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use log::debug;

use crate::error::{CoolCvsError, Result};
use crate::hash::Hash;
use crate::ignore::IgnoreRules;
use crate::objects::{Blob, Commit, Descriptor, Kind, Tree, TreeEntry};
use crate::store::ObjectStore;

pub fn load_commit(store: &ObjectStore, hash: &Hash) -> Result<Commit> {
    let bytes = store.get_object(hash)?;
    let commit = Commit::deserialize(&bytes)?;
    if commit.hash() != *hash {
        return Err(CoolCvsError::Corrupt(format!(
            "commit {hash} does not hash to its own key"
        )));
    }
    Ok(commit)
}

pub fn load_tree(store: &ObjectStore, hash: &Hash) -> Result<Tree> {
    let bytes = store.get_object(hash)?;
    let tree = Tree::deserialize(&bytes)?;
    if tree.hash() != *hash {
        return Err(CoolCvsError::Corrupt(format!(
            "tree {hash} does not hash to its own key"
        )));
    }
    Ok(tree)
}

/// Non-restartable lazy ancestry walk. The initial (root) commit is
/// never yielded — the walk stops one step before it, treating the root
/// as a sentinel rather than a member of its own ancestry.
pub struct Ancestry<'a> {
    store: &'a ObjectStore,
    current: Option<Commit>,
    pending_self: Option<(Hash, Commit)>,
    done: bool,
}

impl<'a> Ancestry<'a> {
    fn new(store: &'a ObjectStore, start_hash: Hash, start: Commit, include_self: bool) -> Self {
        let pending_self = include_self.then(|| (start_hash, start.clone()));
        Self {
            store,
            current: Some(start),
            pending_self,
            done: false,
        }
    }
}

impl<'a> Iterator for Ancestry<'a> {
    type Item = Result<(Hash, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.pending_self.take() {
            return Some(Ok(item));
        }
        if self.done {
            return None;
        }

        let current = self.current.as_ref()?;
        let parent_hash = match current.parent {
            Some(hash) => hash,
            None => {
                self.done = true;
                return None;
            }
        };

        match load_commit(self.store, &parent_hash) {
            Ok(parent) => {
                if parent.parent.is_none() {
                    self.done = true;
                    return None;
                }
                self.current = Some(parent.clone());
                Some(Ok((parent_hash, parent)))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// `parents(c, include_self)`: see [`Ancestry`].
pub fn parents(store: &ObjectStore, start_hash: Hash, include_self: bool) -> Result<Ancestry<'_>> {
    let start = load_commit(store, &start_hash)?;
    Ok(Ancestry::new(store, start_hash, start, include_self))
}

/// Flatten a tree entry to its leaf descriptors: a Blob entry is already a
/// leaf; a live Tree entry is replaced by the (recursively flattened)
/// children of the tree it points at; a tombstoned Tree entry is a leaf
/// in its own right (a whole-directory deletion marker).
fn expand_leaves(store: &ObjectStore, entry: &TreeEntry) -> Result<Vec<(Descriptor, Option<Hash>)>> {
    match (entry.descriptor.kind, entry.descriptor.removed) {
        (Kind::Blob, _) | (Kind::Tree, true) => {
            Ok(vec![(entry.descriptor.clone(), entry.hash)])
        }
        (Kind::Tree, false) => {
            let hash = entry.hash.ok_or_else(|| {
                CoolCvsError::Corrupt(format!(
                    "live tree descriptor '{}' has no child hash",
                    entry.descriptor.path
                ))
            })?;
            let subtree = load_tree(store, &hash)?;
            let mut leaves = Vec::new();
            for child in &subtree.children {
                leaves.extend(expand_leaves(store, child)?);
            }
            Ok(leaves)
        }
    }
}

/// Reconstruct the complete set of live files at commit `c_hash`:
/// newer commits shadow older ones, and a tombstone kills older live
/// entries for the same `(path, kind)`. The returned map may
/// contain tombstoned descriptors as bookkeeping entries — callers that
/// want only live files should filter with [`live_entries`].
pub fn expand_full_tree(
    store: &ObjectStore,
    c_hash: Hash,
) -> Result<BTreeMap<Descriptor, Option<Hash>>> {
    let c = load_commit(store, &c_hash)?;
    let c_tree = load_tree(store, &c.tree)?;

    let mut files: BTreeMap<Descriptor, Option<Hash>> = BTreeMap::new();
    let mut killed: HashSet<Descriptor> = HashSet::new();

    for entry in &c_tree.children {
        if entry.descriptor.removed {
            killed.insert(entry.descriptor.clone());
        }
    }

    for step in parents(store, c_hash, true)? {
        let (_, ancestor) = step?;
        let ancestor_tree = load_tree(store, &ancestor.tree)?;

        for entry in &ancestor_tree.children {
            for (leaf_descriptor, leaf_hash) in expand_leaves(store, entry)? {
                let killed_key = leaf_descriptor.as_removed();
                if killed.contains(&killed_key) {
                    continue;
                }
                let live_key = leaf_descriptor.as_live();
                if files.contains_key(&live_key) {
                    continue;
                }

                let removed = leaf_descriptor.removed;
                files.insert(leaf_descriptor, leaf_hash);
                if removed {
                    killed.insert(killed_key);
                }
            }
        }
    }

    debug!("expanded full tree at {c_hash}: {} entries", files.len());
    Ok(files)
}

/// The live (non-tombstoned) subset of an `expand_full_tree` result.
pub fn live_entries(
    files: &BTreeMap<Descriptor, Option<Hash>>,
) -> impl Iterator<Item = (&Descriptor, &Hash)> {
    files
        .iter()
        .filter(|(d, _)| !d.removed)
        .filter_map(|(d, h)| h.as_ref().map(|h| (d, h)))
}

/// Wipe the working directory (except ignored paths) and recreate it from
/// the full tree state at `c_hash`.
pub fn restore(
    store: &ObjectStore,
    root: &Path,
    c_hash: Hash,
    ignore_rules: &IgnoreRules,
) -> Result<()> {
    let files = expand_full_tree(store, c_hash)?;

    remove_tracked_contents(root, root, ignore_rules)?;

    for (descriptor, hash) in live_entries(&files) {
        let path = root.join(&descriptor.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let blob = Blob::deserialize(&store.get_object(hash)?);
        std::fs::write(&path, blob.content)?;
    }

    Ok(())
}

fn remove_tracked_contents(root: &Path, dir: &Path, ignore_rules: &IgnoreRules) -> Result<()> {
    if !dir.exists() {
        return Ok(());
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");
        let is_dir = path.is_dir();

        if ignore_rules.is_ignored(&relative, is_dir) {
            continue;
        }

        if is_dir {
            remove_tracked_contents(root, &path, ignore_rules)?;
            if std::fs::read_dir(&path)?.next().is_none() {
                std::fs::remove_dir(&path)?;
            }
        } else {
            std::fs::remove_file(&path)?;
        }
    }

    Ok(())
}
