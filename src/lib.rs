//! # cool_cvs — a local, content-addressed version-control engine
//!
//! Every object (blob, tree, commit) is stored under its content hash in
//! `.cool_cvs/objects/`, sharded by the first two hex characters of the
//! hash. Branches and tags are flat files under `.cool_cvs/refs/` holding
//! a hex commit hash; `HEAD` is either a symbolic pointer at a branch or a
//! detached commit hash.
//!
//! Unlike a full Git, a commit's tree stores only the *delta* staged for
//! that commit — the complete file set as of a commit is reconstructed by
//! folding ancestry (see [`history::expand_full_tree`]).
//!
//! ```text
//! .cool_cvs/
//! ├── HEAD              # "ref: heads/<branch>" or a raw hex commit hash
//! ├── objects/<xx>/...  # content-addressed store
//! ├── refs/
//! │   ├── heads/<name>  # branch -> hex commit hash
//! │   └── tags/<name>   # tag -> hex commit hash
//! └── index/            # reserved; the staging index itself is in-memory
//! ```

pub mod commands;
pub mod error;
pub mod hash;
pub mod history;
pub mod ignore;
pub mod index;
pub mod lock;
pub mod objects;
pub mod rebase;
pub mod refs;
pub mod scanner;
pub mod store;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;

use crate::error::{CoolCvsError, Result};
use crate::hash::Hash;
use crate::ignore::IgnoreRules;
use crate::index::Index;
use crate::lock::RepoLock;
use crate::objects::{Commit, Descriptor, Kind, Tree};
use crate::refs::{Branch, Head, Tag};
use crate::store::{ObjectStore, RefStore};

/// The sentinel directory name a repository is rooted at (analogous to
/// `.git`).
pub const CVS_DIR: &str = ".cool_cvs";

/// A working repository: the object/ref stores, the ignore configuration,
/// and the root they're all relative to. The staging [`Index`] is kept
/// separately by callers since it is in-memory only (`index/` on disk
/// is reserved, never read or written by the core).
#[derive(Debug)]
pub struct Repository {
    pub root: PathBuf,
    pub cvs_dir: PathBuf,
    pub store: ObjectStore,
    pub refs: RefStore,
    pub ignore_rules: IgnoreRules,
}

/// A snapshot of where things stand, for the `status` command.
#[derive(Debug)]
pub struct Status {
    pub head: Head,
    pub new: Vec<Descriptor>,
    pub modified: Vec<Descriptor>,
    pub removed: Vec<Descriptor>,
    pub staged: Vec<Descriptor>,
}

impl Repository {
    /// Find the repository root by walking up from the current directory.
    pub fn find() -> Result<Self> {
        Self::find_from(&std::env::current_dir().map_err(CoolCvsError::Io)?)
    }

    /// Find the repository root by walking up from `start`.
    pub fn find_from(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();
        loop {
            if current.join(CVS_DIR).is_dir() {
                return Self::open(current);
            }
            if !current.pop() {
                return Err(CoolCvsError::NotARepository(format!(
                    "not a cool_cvs repository (or any parent directory): {CVS_DIR}"
                )));
            }
        }
    }

    fn open(root: PathBuf) -> Result<Self> {
        let cvs_dir = root.join(CVS_DIR);
        let ignore_rules = ignore::load_ignore_rules(&root)?;
        Ok(Self {
            store: ObjectStore::new(cvs_dir.join("objects")),
            refs: RefStore::new(cvs_dir.join("refs")),
            cvs_dir,
            root,
            ignore_rules,
        })
    }

    /// Create the repository layout, write an empty initial commit, create
    /// `master` at it, and point Head at `master`. Reinitializing an
    /// existing repository is a no-op that just opens it.
    pub fn init(path: &Path) -> Result<Self> {
        let root = path.to_path_buf();
        let cvs_dir = root.join(CVS_DIR);

        if cvs_dir.exists() {
            return Self::open(root);
        }

        std::fs::create_dir(&cvs_dir)?;
        std::fs::create_dir(cvs_dir.join("objects"))?;
        std::fs::create_dir(cvs_dir.join("refs"))?;
        std::fs::create_dir(cvs_dir.join("refs").join(refs::HEADS_DIR))?;
        std::fs::create_dir(cvs_dir.join("refs").join(refs::TAGS_DIR))?;
        std::fs::create_dir(cvs_dir.join("index"))?;

        let repo = Self::open(root)?;

        let empty_tree = Tree::new();
        repo.store.put_object(&empty_tree.hash(), &empty_tree.serialize())?;
        let initial_commit = Commit::new(empty_tree.hash(), None, "initial commit");
        repo.store.put_object(&initial_commit.hash(), &initial_commit.serialize())?;

        refs::write_branch(
            &repo.refs,
            &Branch {
                name: "master".into(),
                commit: initial_commit.hash(),
            },
        )?;
        refs::write_head(&repo.refs, &Head::Symbolic("master".into()))?;

        info!("initialized empty cool_cvs repository at {}", repo.cvs_dir.display());
        Ok(repo)
    }

    fn lock(&self) -> Result<RepoLock> {
        RepoLock::acquire(&self.cvs_dir)
    }

    pub fn head(&self) -> Result<Head> {
        refs::read_head(&self.refs)
    }

    pub fn head_commit(&self) -> Result<Hash> {
        refs::resolve_head_commit(&self.refs, &self.head()?)
    }

    /// Build a fresh [`Index`] diffed against the current Head.
    pub fn load_index(&self) -> Result<Index> {
        let mut index = Index::new();
        let head_commit = self.head_commit().ok();
        index.update(&self.store, &self.root, head_commit, &self.ignore_rules)?;
        Ok(index)
    }

    /// `add <paths...>`: classify each path as Blob or Tree, mark it
    /// `removed` if it no longer exists on disk, and stage it.
    pub fn add_paths(&self, index: &mut Index, paths: &[PathBuf]) -> Result<()> {
        let _lock = self.lock()?;
        for path in paths {
            let absolute = if path.is_absolute() {
                path.clone()
            } else {
                self.root.join(path)
            };
            let relative = absolute
                .strip_prefix(&self.root)
                .unwrap_or(&absolute)
                .to_string_lossy()
                .replace('\\', "/");
            let exists = absolute.exists();
            let kind = if exists && absolute.is_dir() {
                Kind::Tree
            } else {
                Kind::Blob
            };
            let descriptor = Descriptor::new(relative, kind, !exists);
            index.add_to_staged(descriptor, &self.root, &self.ignore_rules);
        }
        Ok(())
    }

    /// `commit [-m msg]`.
    pub fn commit(&self, index: &mut Index, message: &str) -> Result<Option<Hash>> {
        let _lock = self.lock()?;
        let head = self.head()?;
        let head_commit = self.head_commit().ok();
        index.make_commit(
            &self.store,
            &self.refs,
            &self.root,
            &head,
            head_commit,
            &self.ignore_rules,
            message,
        )
    }

    /// `status`: refresh the index against Head, then report each of
    /// {new, removed, modified, staged}, filtering the first three to
    /// exclude descriptors already staged.
    pub fn status(&self, index: &mut Index) -> Result<Status> {
        let head_commit = self.head_commit().ok();
        index.update(&self.store, &self.root, head_commit, &self.ignore_rules)?;

        Ok(Status {
            head: self.head()?,
            new: index
                .new
                .keys()
                .filter(|d| !index.staged.contains(d))
                .cloned()
                .collect(),
            modified: index
                .modified
                .keys()
                .filter(|d| !index.staged.contains(d))
                .cloned()
                .collect(),
            removed: index
                .removed
                .iter()
                .filter(|d| !index.staged.contains(d))
                .cloned()
                .collect(),
            staged: index.staged.iter().cloned().collect(),
        })
    }

    /// `log`: Head commit followed by its ancestry.
    pub fn log(&self) -> Result<Vec<(Hash, Commit)>> {
        let head_hash = self.head_commit()?;
        let head_commit = history::load_commit(&self.store, &head_hash)?;
        let mut entries = vec![(head_hash, head_commit)];
        for step in history::parents(&self.store, head_hash, false)? {
            entries.push(step?);
        }
        Ok(entries)
    }

    pub fn create_branch(&self, name: &str, at: Hash) -> Result<()> {
        let _lock = self.lock()?;
        refs::write_branch(
            &self.refs,
            &Branch {
                name: name.to_string(),
                commit: at,
            },
        )
    }

    pub fn delete_branch(&self, name: &str) -> Result<()> {
        let _lock = self.lock()?;
        refs::delete_branch(&self.refs, name)
    }

    pub fn list_branches(&self) -> Result<Vec<String>> {
        refs::list_branches(&self.refs)
    }

    pub fn create_tag(&self, name: &str, at: Hash) -> Result<()> {
        let _lock = self.lock()?;
        refs::write_tag(&self.refs, &Tag { name: name.to_string(), commit: at })
    }

    pub fn delete_tag(&self, name: &str) -> Result<()> {
        let _lock = self.lock()?;
        refs::delete_tag(&self.refs, name)
    }

    pub fn list_tags(&self) -> Result<Vec<String>> {
        refs::list_tags(&self.refs)
    }

    /// `switch <branch>`: Head := symbolic(branch).
    pub fn switch(&self, branch: &str) -> Result<()> {
        let _lock = self.lock()?;
        refs::read_branch(&self.refs, branch)?;
        refs::write_head(&self.refs, &Head::Symbolic(branch.to_string()))
    }

    /// `checkout <hash-or-tag>`: Head := detached(commit).
    pub fn checkout(&self, target: &str) -> Result<()> {
        let _lock = self.lock()?;
        let commit_hash = self.resolve_commit_ish(target)?;
        refs::write_head(&self.refs, &Head::Detached(commit_hash))
    }

    fn resolve_commit_ish(&self, target: &str) -> Result<Hash> {
        if let Ok(tag) = refs::read_tag(&self.refs, target) {
            return Ok(tag.commit);
        }
        if let Ok(branch) = refs::read_branch(&self.refs, target) {
            return Ok(branch.commit);
        }
        Hash::from_str(target)
    }

    /// `reset [--hard] <hash>`: move Head (and the current branch, if
    /// symbolic) to `target`; optionally materialize it into the working
    /// directory.
    pub fn reset(&self, target: Hash, hard: bool) -> Result<()> {
        let _lock = self.lock()?;
        match self.head()? {
            Head::Symbolic(branch) => refs::write_branch(&self.refs, &Branch { name: branch, commit: target })?,
            Head::Detached(_) => refs::write_head(&self.refs, &Head::Detached(target))?,
        }
        if hard {
            history::restore(&self.store, &self.root, target, &self.ignore_rules)?;
        }
        Ok(())
    }

    /// `rebase <branch>`: initialize and drive the replay loop until it
    /// finishes or suspends on a conflict.
    pub fn rebase_start(&self, source_branch: &str) -> Result<rebase::RebaseState> {
        let _lock = self.lock()?;
        let head = self.head()?;
        rebase::initialize_rebase(&self.store, &self.refs, &self.root, &self.ignore_rules, &head, source_branch)
    }

    /// `rebase --continue`.
    pub fn rebase_continue(&self, state: &mut rebase::RebaseState, resolution_message: &str) -> Result<()> {
        let _lock = self.lock()?;
        state.continue_rebase(&self.store, &self.refs, &self.root, &self.ignore_rules, resolution_message)
    }

    /// `rebase --abort`.
    pub fn rebase_abort(&self, state: rebase::RebaseState) -> Result<()> {
        let _lock = self.lock()?;
        state.abort_rebase(&self.store, &self.refs, &self.root, &self.ignore_rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_layout_and_master_branch() {
        let temp = tempfile::tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        assert!(repo.cvs_dir.join("objects").is_dir());
        assert!(repo.cvs_dir.join("refs").join("heads").is_dir());
        assert_eq!(repo.head().unwrap(), Head::Symbolic("master".into()));
        assert!(refs::read_branch(&repo.refs, "master").is_ok());
    }

    #[test]
    fn reinit_is_idempotent() {
        let temp = tempfile::tempdir().unwrap();
        let first = Repository::init(temp.path()).unwrap();
        let first_head = first.head_commit().unwrap();

        let second = Repository::init(temp.path()).unwrap();
        assert_eq!(second.head_commit().unwrap(), first_head);
    }

    #[test]
    fn find_from_walks_up_to_repository_root() {
        let temp = tempfile::tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        let found = Repository::find_from(&nested).unwrap();
        assert_eq!(found.root, temp.path());
    }

    #[test]
    fn find_from_outside_repository_is_not_a_repository() {
        let temp = tempfile::tempdir().unwrap();
        assert!(matches!(
            Repository::find_from(temp.path()),
            Err(CoolCvsError::NotARepository(_))
        ));
    }

    #[test]
    fn add_and_commit_round_trip() {
        let temp = tempfile::tempdir().unwrap();
        let repo = Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("a.txt"), b"hello").unwrap();

        let mut index = repo.load_index().unwrap();
        repo.add_paths(&mut index, &[temp.path().join("a.txt")]).unwrap();
        let commit_hash = repo.commit(&mut index, "add a").unwrap().unwrap();

        let files = history::expand_full_tree(&repo.store, commit_hash).unwrap();
        assert!(history::live_entries(&files).any(|(d, _)| d.path == "a.txt"));
    }
}
