//! # Tag Command
//!
//! List, create or delete tags. Unlike branches, a tag is immovable once
//! created — `create_tag` fails if the name is already taken.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs tag
//! cool_cvs tag v1.0.0
//! cool_cvs tag -d v1.0.0
//! ```

use anyhow::{Context, Result};

use crate::Repository;

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        anyhow::bail!("fatal: tag name cannot be empty");
    }
    if name.contains('/') || name.contains('\\') || name.contains(' ') {
        anyhow::bail!("fatal: '{name}' is not a valid tag name");
    }
    Ok(())
}

/// Execute the tag command.
pub fn run(name: Option<String>, delete: bool) -> Result<()> {
    let repo = Repository::find()?;

    if delete {
        let name = name.context("fatal: tag name required for deletion")?;
        repo.delete_tag(&name)?;
        println!("deleted tag '{name}'");
    } else if let Some(name) = name {
        validate_name(&name)?;
        let at = repo.head_commit()?;
        repo.create_tag(&name, at)?;
        println!("created tag '{name}'");
    } else {
        let mut tags = repo.list_tags()?;
        tags.sort();
        for tag in tags {
            println!("{tag}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_tag_and_list() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        run(Some("v1.0.0".to_string()), false).unwrap();

        let repo = Repository::find().unwrap();
        assert_eq!(repo.list_tags().unwrap(), vec!["v1.0.0".to_string()]);
    }

    #[test]
    fn test_duplicate_tag_is_rejected() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        run(Some("v1.0.0".to_string()), false).unwrap();
        assert!(run(Some("v1.0.0".to_string()), false).is_err());
    }

    #[test]
    fn test_delete_tag() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        run(Some("v1.0.0".to_string()), false).unwrap();
        run(Some("v1.0.0".to_string()), true).unwrap();

        let repo = Repository::find().unwrap();
        assert!(repo.list_tags().unwrap().is_empty());
    }
}
