//! # Branch Command
//!
//! List, create or delete branches.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs branch
//! cool_cvs branch feature
//! cool_cvs branch -d old-branch
//! ```

use anyhow::{Context, Result};

use crate::refs::Head;
use crate::Repository;

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("fatal: branch name cannot be empty");
    }
    if name.contains('/') || name.contains('\\') || name.contains(' ') {
        anyhow::bail!("fatal: '{name}' is not a valid branch name");
    }
    Ok(())
}

fn list(repo: &Repository) -> Result<()> {
    let current = match repo.head()? {
        Head::Symbolic(branch) => Some(branch),
        Head::Detached(_) => None,
    };

    let mut branches = repo.list_branches()?;
    branches.sort();

    for branch in branches {
        if current.as_deref() == Some(branch.as_str()) {
            println!("* {branch}");
        } else {
            println!("  {branch}");
        }
    }
    Ok(())
}

/// Execute the branch command.
pub fn run(name: Option<String>, delete: bool, force: bool) -> Result<()> {
    let repo = Repository::find()?;

    if delete {
        let name = name.context("fatal: branch name required for deletion")?;
        let current = repo.head()?;
        if !force && current == Head::Symbolic(name.clone()) {
            anyhow::bail!("fatal: cannot delete the currently checked-out branch '{name}'");
        }
        repo.delete_branch(&name)?;
        println!("deleted branch '{name}'");
    } else if let Some(name) = name {
        validate_name(&name)?;
        let at = repo.head_commit()?;
        repo.create_branch(&name, at)?;
        println!("created branch '{name}'");
    } else {
        list(&repo)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_and_list_branches() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        run(Some("feature".to_string()), false, false).unwrap();

        let repo = Repository::find().unwrap();
        let mut branches = repo.list_branches().unwrap();
        branches.sort();
        assert_eq!(branches, vec!["feature".to_string(), "master".to_string()]);
    }

    #[test]
    fn test_duplicate_branch_name_is_fine_to_recreate() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        run(Some("feature".to_string()), false, false).unwrap();
        assert!(run(Some("feature".to_string()), false, false).is_ok());
    }

    #[test]
    fn test_delete_current_branch_requires_force() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        assert!(run(Some("master".to_string()), true, false).is_err());
    }
}
