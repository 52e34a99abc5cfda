//! # Rebase Command
//!
//! Replay the unique commits of `source` onto the branch currently
//! checked out.
//!
//! [`crate::rebase::RebaseState`] lives entirely in memory — nothing
//! records an in-progress rebase to disk. A single `cool_cvs rebase
//! <branch>` invocation can run the whole replay loop to completion or
//! to its first conflict within one process, but a real
//! `--continue`/`--abort` as a *second* process cannot recover state the
//! first process never wrote anywhere. Rather than fabricate a
//! persistence format with no real grounding, this wrapper surfaces that
//! limitation directly: a conflict leaves the working directory holding
//! a conflict-marked file and a message explaining that resolution has
//! to happen through the library API (or a future session that keeps
//! the `RebaseState` value alive) rather than a second CLI invocation.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs rebase feature
//! ```

use anyhow::Result;

use crate::Repository;

/// Execute the rebase command.
pub fn run(source_branch: &str) -> Result<()> {
    let repo = Repository::find()?;
    let state = repo.rebase_start(source_branch)?;

    if state.is_conflict {
        let file = state
            .current_file
            .as_ref()
            .map(|d| d.path.as_str())
            .unwrap_or("<unknown>");
        println!("CONFLICT: {file} conflicts between '{}' and '{}'", state.destination_branch, state.source_branch);
        println!("resolve the conflict markers in {file}, then finish the rebase");
        println!("through the library API in the same process — a separate");
        println!("`--continue`/`--abort` invocation cannot recover this in-progress");
        println!("rebase, since its state was never persisted to disk.");
        anyhow::bail!("rebase stopped at a conflict");
    }

    println!(
        "successfully rebased '{}' onto '{}'",
        state.source_branch, state.destination_branch
    );
    Ok(())
}
