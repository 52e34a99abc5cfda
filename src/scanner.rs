//! # Working-tree scanner
//!
//! Enumerates the directory rooted at the repository, recursively.
//! Subdirectories are only ever descended into, never themselves yielded
//! as entries — a directory is represented by the union of the blob
//! descriptors found beneath it. The sentinel repository directory and
//! anything in the configured ignore set are skipped entirely, files and
//! directories alike.

use std::collections::BTreeMap;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;
use crate::hash::Hash;
use crate::ignore::IgnoreRules;
use crate::objects::{Blob, Descriptor};

/// Scan `root`, returning every live file as a `(Descriptor, Hash)` pair
/// keyed by its path relative to `root`, skipping ignored paths.
pub fn scan(root: &Path, ignore_rules: &IgnoreRules) -> Result<BTreeMap<Descriptor, Hash>> {
    let mut files = BTreeMap::new();

    let mut walker = WalkDir::new(root).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if path == root {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .expect("walkdir yields paths under root")
            .to_string_lossy()
            .replace('\\', "/");

        let is_dir = entry.file_type().is_dir();
        if ignore_rules.is_ignored(&relative, is_dir) {
            if is_dir {
                walker.skip_current_dir();
            }
            continue;
        }

        if is_dir {
            continue;
        }

        let blob = Blob::from_file(path)?;
        let hash = blob.hash();
        files.insert(Descriptor::blob(relative, false), hash);
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_nested_files() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"hi").unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();
        std::fs::write(temp.path().join("sub/b.txt"), b"there").unwrap();

        let files = scan(temp.path(), &IgnoreRules::new()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.contains_key(&Descriptor::blob("a.txt", false)));
        assert!(files.contains_key(&Descriptor::blob("sub/b.txt", false)));
    }

    #[test]
    fn skips_ignored_directories_entirely() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("target")).unwrap();
        std::fs::write(temp.path().join("target/out.bin"), b"x").unwrap();
        std::fs::write(temp.path().join("keep.txt"), b"y").unwrap();
        std::fs::write(temp.path().join(".cvsignore"), "target/\n").unwrap();

        let ignore_rules = crate::ignore::load_ignore_rules(temp.path()).unwrap();
        let files = scan(temp.path(), &ignore_rules).unwrap();

        assert!(!files.keys().any(|d| d.path.starts_with("target")));
        assert!(files.contains_key(&Descriptor::blob("keep.txt", false)));
    }

    #[test]
    fn sentinel_directory_is_always_skipped() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join(crate::CVS_DIR).join("objects")).unwrap();
        std::fs::write(
            temp.path().join(crate::CVS_DIR).join("objects/junk"),
            b"x",
        )
        .unwrap();
        std::fs::write(temp.path().join("real.txt"), b"y").unwrap();

        let ignore_rules = crate::ignore::load_ignore_rules(temp.path()).unwrap();
        let files = scan(temp.path(), &ignore_rules).unwrap();

        assert_eq!(files.len(), 1);
        assert!(files.contains_key(&Descriptor::blob("real.txt", false)));
    }
}
