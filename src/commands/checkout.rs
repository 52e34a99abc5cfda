//! # Checkout Command
//!
//! Detach HEAD at a commit, tag, or branch tip, without touching the
//! working directory — use `reset --hard` to materialize it.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs checkout <commit-hash>
//! cool_cvs checkout v1.0.0
//! ```

use anyhow::Result;

use crate::Repository;

/// Execute the checkout command.
pub fn run(target: &str) -> Result<()> {
    let repo = Repository::find()?;
    repo.checkout(target)?;
    println!("HEAD is now detached at {target}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_checkout_by_hash_detaches_head() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("a.txt"), b"hi").unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        crate::commands::add::run(vec!["a.txt".to_string()]).unwrap();
        crate::commands::commit::run("add a").unwrap();

        let repo = Repository::find().unwrap();
        let first_commit = repo.log().unwrap()[0].0;

        run(&first_commit.to_hex()).unwrap();

        assert_eq!(
            repo.head().unwrap(),
            crate::refs::Head::Detached(first_commit)
        );
    }
}
