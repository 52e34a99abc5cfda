//! # Switch Command
//!
//! Move HEAD to point at a different branch, without touching the
//! working directory — the branch's own history is already what's
//! checked out — there's no fast-forward/merge machinery here.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs switch feature
//! ```

use anyhow::Result;

use crate::Repository;

/// Execute the switch command.
pub fn run(branch: &str) -> Result<()> {
    let repo = Repository::find()?;
    repo.switch(branch)?;
    println!("switched to branch '{branch}'");
    Ok(())
}
