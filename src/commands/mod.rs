//! # CLI command wrappers
//!
//! One module per subcommand, each a thin wrapper calling exactly one
//! [`crate::Repository`] (or [`crate::rebase::RebaseState`]) operation and
//! formatting its result for the terminal. No core logic lives here —
//! argument parsing is `main.rs`'s job via `clap`, and every wrapper
//! resolves the current repository with `Repository::find()`.

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod init;
pub mod log;
pub mod rebase;
pub mod reset;
pub mod status;
pub mod switch;
pub mod tag;

use std::collections::BTreeSet;

use anyhow::{Context, Result};

use crate::objects::{Descriptor, Kind};
use crate::Repository;

/// Plain-text bridge for the staged set across separate CLI invocations.
///
/// [`crate::index::Index`] itself is deliberately in-memory only (see its
/// module docs) — a single process never persists it. But `add` and
/// `commit` are two separate `cool_cvs` invocations, so the CLI layer
/// keeps its own flat record of what's staged, one descriptor per line
/// (`blob|tree \t 0|1 \t path`), at the reserved `index/staged` path.
/// This is a CLI-only convenience, not a core format.
fn staged_path(repo: &Repository) -> std::path::PathBuf {
    repo.cvs_dir.join("index").join("staged")
}

fn load_staged(repo: &Repository) -> Result<BTreeSet<Descriptor>> {
    let path = staged_path(repo);
    if !path.exists() {
        return Ok(BTreeSet::new());
    }
    let text = std::fs::read_to_string(&path).context("failed to read staged-set file")?;
    let mut staged = BTreeSet::new();
    for line in text.lines() {
        let mut fields = line.splitn(3, '\t');
        let kind = fields.next().unwrap_or("");
        let removed = fields.next().unwrap_or("");
        let path = fields.next().unwrap_or("");
        if path.is_empty() {
            continue;
        }
        let kind = match kind {
            "blob" => Kind::Blob,
            "tree" => Kind::Tree,
            other => anyhow::bail!("corrupt staged-set entry: unknown kind '{other}'"),
        };
        staged.insert(Descriptor::new(path.to_string(), kind, removed == "1"));
    }
    Ok(staged)
}

fn save_staged(repo: &Repository, staged: &BTreeSet<Descriptor>) -> Result<()> {
    let mut text = String::new();
    for descriptor in staged {
        text.push_str(&format!(
            "{}\t{}\t{}\n",
            descriptor.kind,
            if descriptor.removed { 1 } else { 0 },
            descriptor.path
        ));
    }
    std::fs::write(staged_path(repo), text).context("failed to write staged-set file")?;
    Ok(())
}
