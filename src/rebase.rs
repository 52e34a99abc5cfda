//! # Rebase state machine
//!
//! Linear replay of a source branch's unique commits onto the tip of the
//! current (destination) branch, suspending on the first conflicting
//! descriptor and resuming once the caller has fixed the working tree.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use imara_diff::{Algorithm, BasicLineDiffPrinter, Diff, InternedInput, UnifiedDiffConfig};
use log::info;

use crate::error::{CoolCvsError, Result};
use crate::hash::Hash;
use crate::history;
use crate::ignore::IgnoreRules;
use crate::objects::{Blob, Commit, Descriptor, Tree};
use crate::refs::{self, Branch, Head};
use crate::store::{ObjectStore, RefStore};

#[derive(Debug)]
pub struct RebaseState {
    pub source_branch: String,
    pub destination_branch: String,
    /// Source-unique ancestors, tip-to-common-ancestor order. Replayed by
    /// popping from the end, which yields the oldest unique commit first —
    /// the correct chronological replay order.
    not_applied: Vec<(Hash, Commit)>,
    pub applied: HashSet<Hash>,
    pub destination_branch_changed: HashSet<Descriptor>,
    pub current_dst_commit: Hash,
    pub current_file: Option<Descriptor>,
    pub resolved_files: HashSet<Descriptor>,
    pub is_conflict: bool,
    /// The destination tip as it stood before this rebase began, for abort.
    destination_commit: Hash,
    /// The source commit currently mid-replay (set while suspended on a
    /// conflict, or while resuming the remainder of its entries).
    current_commit: Option<(Hash, Commit)>,
    /// Entries accumulated for the commit currently being replayed,
    /// including ones already resolved from a prior conflict.
    amended_entries: BTreeMap<Descriptor, Option<Hash>>,
}

impl RebaseState {
    fn setup(store: &ObjectStore, refs: &RefStore, head: &Head, source_branch: &str) -> Result<Self> {
        let destination_branch = refs::branch_from_head(head)?.to_string();
        let destination_commit = refs::read_branch(refs, &destination_branch)?.commit;
        let source_commit = refs::read_branch(refs, source_branch)?.commit;

        let mut dst_ancestry = Vec::new();
        for step in history::parents(store, destination_commit, true)? {
            dst_ancestry.push(step?);
        }
        let dst_hashes: HashSet<Hash> = dst_ancestry.iter().map(|(h, _)| *h).collect();

        let mut not_applied = Vec::new();
        let mut common_ancestor = None;
        for step in history::parents(store, source_commit, true)? {
            let (hash, commit) = step?;
            if dst_hashes.contains(&hash) {
                common_ancestor = Some(hash);
                break;
            }
            not_applied.push((hash, commit));
        }

        let mut destination_branch_changed = HashSet::new();
        for (hash, commit) in &dst_ancestry {
            let tree = history::load_tree(store, &commit.tree)?;
            for entry in &tree.children {
                destination_branch_changed.insert(entry.descriptor.clone());
            }
            if Some(*hash) == common_ancestor {
                break;
            }
        }

        Ok(Self {
            source_branch: source_branch.to_string(),
            destination_branch,
            not_applied,
            applied: HashSet::new(),
            destination_branch_changed,
            current_dst_commit: destination_commit,
            current_file: None,
            resolved_files: HashSet::new(),
            is_conflict: false,
            destination_commit,
            current_commit: None,
            amended_entries: BTreeMap::new(),
        })
    }

    /// Process the entries of `s` not already in `resolved_files`, stopping
    /// (and recording suspension state) at the first conflicting one.
    /// Returns `true` if a conflict suspended replay.
    fn replay_tree_entries(
        &mut self,
        store: &ObjectStore,
        root: &Path,
        s_hash: Hash,
        s: &Commit,
    ) -> Result<bool> {
        let tree = history::load_tree(store, &s.tree)?;

        for entry in &tree.children {
            if self.resolved_files.contains(&entry.descriptor) {
                continue;
            }
            self.current_file = Some(entry.descriptor.clone());
            self.resolved_files.insert(entry.descriptor.clone());

            if self.destination_branch_changed.contains(&entry.descriptor) {
                let source_text = read_blob_text(store, entry.hash)?;
                let path = root.join(&entry.descriptor.path);
                let working_text = std::fs::read_to_string(&path).unwrap_or_default();
                let artifact = conflict_artifact(&entry.descriptor.path, &working_text, &source_text);
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&path, artifact)?;

                self.is_conflict = true;
                self.current_commit = Some((s_hash, s.clone()));
                return Ok(true);
            }

            self.amended_entries.insert(entry.descriptor.clone(), entry.hash);
        }

        Ok(false)
    }

    fn finish_commit(&mut self, store: &ObjectStore, refs: &RefStore, s_hash: Hash, message: &str) -> Result<()> {
        let mut tree = Tree::new();
        for (descriptor, hash) in std::mem::take(&mut self.amended_entries) {
            tree.add_entry(descriptor, hash);
        }
        store.put_object(&tree.hash(), &tree.serialize())?;

        let commit = Commit::new(tree.hash(), Some(self.current_dst_commit), message);
        store.put_object(&commit.hash(), &commit.serialize())?;

        refs::write_branch(
            refs,
            &Branch {
                name: self.destination_branch.clone(),
                commit: commit.hash(),
            },
        )?;

        info!("rebase: replayed {s_hash} as {}", commit.hash());
        self.applied.insert(s_hash);
        self.current_dst_commit = commit.hash();
        self.resolved_files.clear();
        self.current_commit = None;
        Ok(())
    }

    /// Drive the replay loop until `not_applied` is exhausted or a conflict
    /// suspends it. On success, restores the working tree to the new tip.
    pub fn run(&mut self, store: &ObjectStore, refs: &RefStore, root: &Path, ignore_rules: &IgnoreRules) -> Result<()> {
        if self.is_conflict {
            return Ok(());
        }

        loop {
            let (s_hash, s) = match self.current_commit.take() {
                Some(pair) => pair,
                None => match self.not_applied.pop() {
                    Some(pair) => pair,
                    None => {
                        history::restore(store, root, self.current_dst_commit, ignore_rules)?;
                        return Ok(());
                    }
                },
            };

            let message = s.message.clone();
            if self.replay_tree_entries(store, root, s_hash, &s)? {
                return Ok(());
            }
            self.finish_commit(store, refs, s_hash, &message)?;
        }
    }

    /// Resume after a conflict: fold the caller's resolved working-tree
    /// content for `current_file` back in, finish processing the rest of
    /// the suspended commit's entries, and continue the replay loop.
    pub fn continue_rebase(
        &mut self,
        store: &ObjectStore,
        refs: &RefStore,
        root: &Path,
        ignore_rules: &IgnoreRules,
        resolution_message: &str,
    ) -> Result<()> {
        if !self.is_conflict {
            return Err(CoolCvsError::InvalidState(
                "continue_rebase called with no active conflict".into(),
            ));
        }
        let (s_hash, s) = self
            .current_commit
            .clone()
            .ok_or_else(|| CoolCvsError::InvalidState("no rebase commit in progress".into()))?;
        let resolved_descriptor = self
            .current_file
            .clone()
            .ok_or_else(|| CoolCvsError::InvalidState("no conflicting descriptor recorded".into()))?;

        self.is_conflict = false;

        let resolved_path = root.join(&resolved_descriptor.path);
        let resolved_blob = Blob::from_file(&resolved_path)?;
        store.put_object(&resolved_blob.hash(), &resolved_blob.serialize())?;
        self.amended_entries
            .insert(resolved_descriptor, Some(resolved_blob.hash()));

        if self.replay_tree_entries(store, root, s_hash, &s)? {
            return Ok(());
        }
        self.finish_commit(store, refs, s_hash, resolution_message)?;

        self.run(store, refs, root, ignore_rules)
    }

    /// Move Head and the destination branch back to the pre-rebase tip,
    /// restore the working directory, and discard the state.
    pub fn abort_rebase(self, store: &ObjectStore, refs: &RefStore, root: &Path, ignore_rules: &IgnoreRules) -> Result<()> {
        refs::write_branch(
            refs,
            &Branch {
                name: self.destination_branch.clone(),
                commit: self.destination_commit,
            },
        )?;
        refs::write_head(refs, &Head::Symbolic(self.destination_branch))?;
        history::restore(store, root, self.destination_commit, ignore_rules)
    }
}

/// Initialize a rebase of `source_branch` onto the branch Head currently
/// names, and drive the replay loop until it finishes or suspends.
pub fn initialize_rebase(
    store: &ObjectStore,
    refs: &RefStore,
    root: &Path,
    ignore_rules: &IgnoreRules,
    head: &Head,
    source_branch: &str,
) -> Result<RebaseState> {
    let mut state = RebaseState::setup(store, refs, head, source_branch)?;
    state.run(store, refs, root, ignore_rules)?;
    Ok(state)
}

fn read_blob_text(store: &ObjectStore, hash: Option<Hash>) -> Result<String> {
    match hash {
        Some(hash) => {
            let blob = Blob::deserialize(&store.get_object(&hash)?);
            Ok(blob.as_text().unwrap_or_default())
        }
        None => Ok(String::new()),
    }
}

fn conflict_artifact(path: &str, working_text: &str, incoming_text: &str) -> String {
    let input = InternedInput::new(working_text, incoming_text);
    let mut diff = Diff::compute(Algorithm::Histogram, &input);
    diff.postprocess_lines(&input);

    if diff.hunks().next().is_none() {
        return working_text.to_string();
    }

    let printer = BasicLineDiffPrinter(&input.interner);
    let unified = diff.unified_diff(&printer, UnifiedDiffConfig::default(), &input);

    format!("<<<<<<< working tree ({path})\n{unified}>>>>>>> incoming\n")
}
