//! # Log Command
//!
//! Display commit history by walking the parent chain from HEAD.
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs log
//! cool_cvs log --oneline
//! ```

use anyhow::Result;

use crate::objects::Commit;
use crate::Repository;

fn format_commit(hash: &str, commit: &Commit, oneline: bool) -> String {
    if oneline {
        let short = &hash[..7.min(hash.len())];
        let message_line = commit.message.lines().next().unwrap_or("");
        format!("{short} {message_line}")
    } else {
        let mut lines = vec![format!("commit {hash}")];
        if let Some(parent) = &commit.parent {
            lines.push(format!("parent {}", parent.to_hex()));
        }
        lines.push(String::new());
        for line in commit.message.lines() {
            lines.push(format!("    {line}"));
        }
        lines.join("\n")
    }
}

/// Execute the log command.
pub fn run(oneline: bool) -> Result<()> {
    let repo = Repository::find()?;

    let entries = match repo.log() {
        Ok(entries) => entries,
        Err(_) => {
            println!("fatal: your current branch does not have any commits yet");
            return Ok(());
        }
    };

    for (hash, commit) in entries {
        println!("{}", format_commit(&hash.to_hex(), &commit, oneline));
        if !oneline {
            println!();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_with_no_commits_after_init() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        // init already makes the initial commit; log should succeed.
        run(true).unwrap();
    }

    #[test]
    fn test_log_after_commit() {
        let temp = tempdir().unwrap();
        Repository::init(temp.path()).unwrap();
        std::fs::write(temp.path().join("a.txt"), b"hi").unwrap();
        std::env::set_current_dir(temp.path()).unwrap();

        crate::commands::add::run(vec!["a.txt".to_string()]).unwrap();
        crate::commands::commit::run("add a").unwrap();

        let repo = Repository::find().unwrap();
        assert_eq!(repo.log().unwrap().len(), 2);
    }
}
