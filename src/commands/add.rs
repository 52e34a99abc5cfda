//! # Add Command
//!
//! Stage files for the next commit.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs add file.txt
//! cool_cvs add file1.txt file2.txt
//! cool_cvs add .
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::commands::{load_staged, save_staged};
use crate::Repository;

/// Execute the add command.
pub fn run(paths: Vec<String>) -> Result<()> {
    let repo = Repository::find()?;
    let mut index = repo.load_index()?;
    index.staged = load_staged(&repo)?;

    let resolved: Vec<PathBuf> = paths
        .into_iter()
        .map(|p| {
            let path = PathBuf::from(&p);
            if path.is_absolute() {
                Ok(path)
            } else {
                std::env::current_dir()
                    .context("failed to read current directory")
                    .map(|cwd| cwd.join(path))
            }
        })
        .collect::<Result<Vec<_>>>()?;

    repo.add_paths(&mut index, &resolved)?;
    save_staged(&repo, &index.staged)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_add_file() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("test.txt"), b"test content").unwrap();

        std::env::set_current_dir(temp.path()).unwrap();
        run(vec!["test.txt".to_string()]).unwrap();

        let repo = Repository::find().unwrap();
        let staged = load_staged(&repo).unwrap();
        assert!(staged.iter().any(|d| d.path == "test.txt"));
    }

    #[test]
    fn test_add_nonexistent_path_is_a_noop() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        run(vec!["missing.txt".to_string()]).unwrap();

        let repo = Repository::find().unwrap();
        assert!(load_staged(&repo).unwrap().is_empty());
    }
}
