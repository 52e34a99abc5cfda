//! # Status Command
//!
//! Show the working tree status: staged, new, modified or removed paths
//! relative to HEAD.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs status
//! ```

use anyhow::Result;

use crate::commands::load_staged;
use crate::refs::Head;
use crate::Repository;

/// Execute the status command.
pub fn run() -> Result<()> {
    let repo = Repository::find()?;
    let mut index = repo.load_index()?;
    index.staged = load_staged(&repo)?;

    let status = repo.status(&mut index)?;

    match status.head {
        Head::Symbolic(branch) => println!("on branch {branch}"),
        Head::Detached(hash) => println!("HEAD detached at {}", &hash.to_hex()[..7]),
    }
    println!();

    if status.staged.is_empty()
        && status.new.is_empty()
        && status.modified.is_empty()
        && status.removed.is_empty()
    {
        println!("nothing to commit, working tree clean");
        return Ok(());
    }

    if !status.staged.is_empty() {
        println!("changes to be committed:");
        for descriptor in &status.staged {
            println!("        {descriptor}");
        }
        println!();
    }

    if !status.new.is_empty() {
        println!("untracked:");
        for descriptor in &status.new {
            println!("        {descriptor}");
        }
        println!();
    }

    if !status.modified.is_empty() {
        println!("modified, not staged:");
        for descriptor in &status.modified {
            println!("        {descriptor}");
        }
        println!();
    }

    if !status.removed.is_empty() {
        println!("removed, not staged:");
        for descriptor in &status.removed {
            println!("        {descriptor}");
        }
        println!();
    }

    Ok(())
}
