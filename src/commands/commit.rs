//! # Commit Command
//!
//! Create a commit from the staging area.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs commit -m "message"
//! ```

use anyhow::Result;

use crate::commands::{load_staged, save_staged};
use crate::Repository;

/// Execute the commit command.
pub fn run(message: &str) -> Result<()> {
    let repo = Repository::find()?;
    let mut index = repo.load_index()?;
    index.staged = load_staged(&repo)?;

    if index.staged.is_empty() {
        println!("nothing to commit, working tree clean");
        return Ok(());
    }

    let staged_count = index.staged.len();
    match repo.commit(&mut index, message)? {
        Some(hash) => {
            let short = &hash.to_hex()[..7];
            println!("[{short}] {message}");
            println!(" {staged_count} file(s) changed");
        }
        None => println!("nothing to commit, working tree clean"),
    }

    save_staged(&repo, &index.staged)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_commit_with_nothing_staged() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        run("empty commit").unwrap();

        let repo = Repository::find().unwrap();
        let log = repo.log().unwrap();
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_add_then_commit() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("a.txt"), b"hi").unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        crate::commands::add::run(vec!["a.txt".to_string()]).unwrap();
        run("add a").unwrap();

        let repo = Repository::find().unwrap();
        let log = repo.log().unwrap();
        assert_eq!(log.len(), 2);
        assert!(load_staged(&repo).unwrap().is_empty());
    }
}
