//! # Reset Command
//!
//! Move the current branch (or detached HEAD) to an arbitrary commit,
//! optionally rewriting the working directory to match.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs reset <commit-hash>
//! cool_cvs reset --hard <commit-hash>
//! ```

use anyhow::Result;

use crate::Repository;

/// Execute the reset command. `target` resolves as a tag, branch or raw
/// commit hash, in that order (mirroring `Repository::checkout`).
pub fn run(target: &str, hard: bool) -> Result<()> {
    let repo = Repository::find()?;

    let hash = crate::refs::read_tag(&repo.refs, target)
        .map(|t| t.commit)
        .or_else(|_| crate::refs::read_branch(&repo.refs, target).map(|b| b.commit))
        .or_else(|_| target.parse())?;

    repo.reset(hash, hard)?;
    println!("reset to {}", hash.to_hex());
    Ok(())
}
