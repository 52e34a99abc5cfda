//! # Index (staging area)
//!
//! This index is in-memory only — the on-disk layout reserves `index/`
//! but the core never reads or writes it; a process restart loses
//! staged-but-uncommitted state, the same acknowledged limitation
//! `RebaseState` has.
//!
//! Four sets of descriptors, all keyed by `(path, kind)` once flattened
//! to avoid double-booking a path under both its live and tombstoned
//! form: `staged`, `new`, `modified`, `removed`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use log::info;

use crate::error::Result;
use crate::hash::Hash;
use crate::history;
use crate::ignore::IgnoreRules;
use crate::objects::{Blob, Commit, Descriptor, Kind, Tree};
use crate::refs::{self, Head};
use crate::scanner;
use crate::store::{ObjectStore, RefStore};

#[derive(Debug, Default)]
pub struct Index {
    pub staged: BTreeSet<Descriptor>,
    pub new: BTreeMap<Descriptor, Hash>,
    pub modified: BTreeMap<Descriptor, Hash>,
    pub removed: BTreeSet<Descriptor>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute `new`/`modified`/`removed` against the scanner's current
    /// output and the historical tree at `head_commit` (absent for a
    /// repository with no commits yet). `staged` is left untouched.
    pub fn update(
        &mut self,
        store: &ObjectStore,
        root: &Path,
        head_commit: Option<Hash>,
        ignore_rules: &IgnoreRules,
    ) -> Result<()> {
        let scanned = scanner::scan(root, ignore_rules)?;

        let historical: BTreeMap<Descriptor, Hash> = match head_commit {
            Some(commit) => {
                let files = history::expand_full_tree(store, commit)?;
                history::live_entries(&files)
                    .map(|(d, h)| (d.clone(), *h))
                    .collect()
            }
            None => BTreeMap::new(),
        };

        self.new.clear();
        self.modified.clear();
        self.removed.clear();

        for (descriptor, hash) in &scanned {
            match historical.get(descriptor) {
                None => {
                    self.new.insert(descriptor.clone(), *hash);
                }
                Some(old_hash) if old_hash != hash => {
                    self.modified.insert(descriptor.clone(), *hash);
                }
                Some(_) => {}
            }
        }

        for descriptor in historical.keys() {
            if !scanned.contains_key(descriptor) {
                self.removed.insert(descriptor.as_removed());
            }
        }

        Ok(())
    }

    /// Stage `descriptor`. Blob descriptors are scoped against the
    /// computed diff (`new`/`modified`/`removed`).
    /// Tree (directory) descriptors never appear in that flat, blob-only
    /// diff — the scanner only ever yields Blob leaves — so they are
    /// scoped instead by existence on disk, mirroring how the outer `add`
    /// command classifies a path before calling this.
    pub fn add_to_staged(&mut self, descriptor: Descriptor, root: &Path, ignore_rules: &IgnoreRules) {
        if self.staged.contains(&descriptor) {
            return;
        }
        if ignore_rules.is_ignored(&descriptor.path, descriptor.kind == Kind::Tree) {
            return;
        }

        let in_scope = match descriptor.kind {
            Kind::Blob => {
                self.new.contains_key(&descriptor)
                    || self.modified.contains_key(&descriptor)
                    || self.removed.contains(&descriptor)
            }
            Kind::Tree => {
                let exists = root.join(&descriptor.path).is_dir();
                exists != descriptor.removed
            }
        };

        if !in_scope {
            return;
        }

        self.staged.insert(descriptor);
    }

    /// `make_commit`: materialize staged descriptors into objects, build
    /// the delta tree, derive and store the new commit, advance Head, and
    /// clear `staged`. No-op if nothing is staged.
    #[allow(clippy::too_many_arguments)]
    pub fn make_commit(
        &mut self,
        store: &ObjectStore,
        refs: &RefStore,
        root: &Path,
        head: &Head,
        head_commit: Option<Hash>,
        ignore_rules: &IgnoreRules,
        message: &str,
    ) -> Result<Option<Hash>> {
        if self.staged.is_empty() {
            return Ok(None);
        }

        let mut tree = Tree::new();

        for descriptor in &self.staged {
            let child_hash = materialize(store, root, descriptor, ignore_rules)?;
            tree.add_entry(descriptor.clone(), child_hash);
        }

        store.put_object(&tree.hash(), &tree.serialize())?;
        let commit = Commit::new(tree.hash(), head_commit, message);
        store.put_object(&commit.hash(), &commit.serialize())?;

        match head {
            Head::Symbolic(branch_name) => {
                refs::write_branch(
                    refs,
                    &refs::Branch {
                        name: branch_name.clone(),
                        commit: commit.hash(),
                    },
                )?;
            }
            Head::Detached(_) => {
                refs::write_head(refs, &Head::Detached(commit.hash()))?;
            }
        }

        info!("committed {} ({} staged entries)", commit.hash(), self.staged.len());
        self.staged.clear();
        Ok(Some(commit.hash()))
    }
}

fn materialize(
    store: &ObjectStore,
    root: &Path,
    descriptor: &Descriptor,
    ignore_rules: &IgnoreRules,
) -> Result<Option<Hash>> {
    if descriptor.removed {
        let tombstone = Blob::tombstone();
        store.put_object(&tombstone.hash(), &tombstone.serialize())?;
        return Ok(None);
    }

    match descriptor.kind {
        Kind::Blob => {
            let blob = Blob::from_file(&root.join(&descriptor.path))?;
            store.put_object(&blob.hash(), &blob.serialize())?;
            Ok(Some(blob.hash()))
        }
        Kind::Tree => {
            let subtree = snapshot_directory(
                store,
                &root.join(&descriptor.path),
                &descriptor.path,
                ignore_rules,
            )?;
            store.put_object(&subtree.hash(), &subtree.serialize())?;
            Ok(Some(subtree.hash()))
        }
    }
}

/// Join a repository-relative directory path with a child name, treating
/// `""` (the repository root itself) as having no prefix to concatenate
/// — otherwise a bare `name` comes out as `/name`, which `Path::join`
/// later treats as absolute and resolves outside the repository root.
fn join_relative(relative_dir: &str, name: &str) -> String {
    if relative_dir.is_empty() {
        name.to_string()
    } else {
        format!("{relative_dir}/{name}")
    }
}

/// Recursively snapshot a directory into nested Tree/Blob objects.
/// Children keep full repository-relative paths (not paths relative to
/// the subdirectory), so ancestry folding's leaf-flattening needs no
/// path concatenation when it recurses into a nested tree.
fn snapshot_directory(
    store: &ObjectStore,
    absolute_dir: &Path,
    relative_dir: &str,
    ignore_rules: &IgnoreRules,
) -> Result<Tree> {
    let mut tree = Tree::new();

    for entry in std::fs::read_dir(absolute_dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let relative = join_relative(relative_dir, &name);
        let path = entry.path();
        let is_dir = path.is_dir();

        if ignore_rules.is_ignored(&relative, is_dir) {
            continue;
        }

        if is_dir {
            let subtree = snapshot_directory(store, &path, &relative, ignore_rules)?;
            store.put_object(&subtree.hash(), &subtree.serialize())?;
            tree.add_entry(Descriptor::tree(relative, false), Some(subtree.hash()));
        } else {
            let blob = Blob::from_file(&path)?;
            store.put_object(&blob.hash(), &blob.serialize())?;
            tree.add_entry(Descriptor::blob(relative, false), Some(blob.hash()));
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_classifies_new_files() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"hi").unwrap();
        let store = ObjectStore::new(temp.path().join(".objects"));

        let mut index = Index::new();
        index
            .update(&store, temp.path(), None, &IgnoreRules::new())
            .unwrap();

        assert_eq!(index.new.len(), 1);
        assert!(index.modified.is_empty());
        assert!(index.removed.is_empty());
    }

    #[test]
    fn add_to_staged_ignores_out_of_scope_descriptor() {
        let temp = tempfile::tempdir().unwrap();
        let mut index = Index::new();
        index.add_to_staged(
            Descriptor::blob("never-scanned.txt", false),
            temp.path(),
            &IgnoreRules::new(),
        );
        assert!(index.staged.is_empty());
    }

    #[test]
    fn add_to_staged_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"hi").unwrap();
        let store = ObjectStore::new(temp.path().join(".objects"));

        let mut index = Index::new();
        index
            .update(&store, temp.path(), None, &IgnoreRules::new())
            .unwrap();

        let descriptor = Descriptor::blob("a.txt", false);
        index.add_to_staged(descriptor.clone(), temp.path(), &IgnoreRules::new());
        index.add_to_staged(descriptor, temp.path(), &IgnoreRules::new());
        assert_eq!(index.staged.len(), 1);
    }

    #[test]
    fn make_commit_is_noop_when_nothing_staged() {
        let temp = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(temp.path().join("objects"));
        let refs = RefStore::new(temp.path().join("refs"));

        let mut index = Index::new();
        let result = index
            .make_commit(
                &store,
                &refs,
                temp.path(),
                &Head::Symbolic("master".into()),
                None,
                &IgnoreRules::new(),
                "empty",
            )
            .unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn make_commit_advances_symbolic_branch() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"hi").unwrap();
        let store = ObjectStore::new(temp.path().join("objects"));
        let refs = RefStore::new(temp.path().join("refs"));
        refs::write_branch(
            &refs,
            &refs::Branch {
                name: "master".into(),
                commit: Hash::digest_tagged("commit", &[b"root"]),
            },
        )
        .unwrap();

        let mut index = Index::new();
        index
            .update(&store, temp.path(), None, &IgnoreRules::new())
            .unwrap();
        index.add_to_staged(Descriptor::blob("a.txt", false), temp.path(), &IgnoreRules::new());

        let commit_hash = index
            .make_commit(
                &store,
                &refs,
                temp.path(),
                &Head::Symbolic("master".into()),
                None,
                &IgnoreRules::new(),
                "add a",
            )
            .unwrap()
            .unwrap();

        let branch = refs::read_branch(&refs, "master").unwrap();
        assert_eq!(branch.commit, commit_hash);
        assert!(index.staged.is_empty());
    }

    #[test]
    fn join_relative_does_not_produce_a_leading_slash_at_the_repository_root() {
        assert_eq!(join_relative("", "a.txt"), "a.txt");
        assert_eq!(join_relative("sub", "a.txt"), "sub/a.txt");
    }

    #[test]
    fn snapshot_directory_of_the_repository_root_keeps_relative_paths() {
        let work = tempfile::tempdir().unwrap();
        let objects = tempfile::tempdir().unwrap();
        std::fs::write(work.path().join("a.txt"), b"hi").unwrap();
        std::fs::create_dir(work.path().join("sub")).unwrap();
        std::fs::write(work.path().join("sub/b.txt"), b"there").unwrap();

        let store = ObjectStore::new(objects.path().to_path_buf());
        let tree = snapshot_directory(&store, work.path(), "", &IgnoreRules::new()).unwrap();

        for entry in &tree.children {
            assert!(
                !entry.descriptor.path.starts_with('/'),
                "path must not be absolute-looking: {}",
                entry.descriptor.path
            );
        }
        assert!(tree.children.iter().any(|e| e.descriptor.path == "a.txt"));
        assert!(tree.children.iter().any(|e| e.descriptor.path == "sub"));
    }
}
