//! # Named references
//!
//! Branches, tags and Head. A branch is a movable pointer; a tag is the
//! same shape but immovable once created; Head is a two-variant sum —
//! symbolic (names a branch) or detached (names a commit directly) —
//! rather than holding a full branch object, keeping the in-memory form
//! a thin variant over the canonical on-disk string.

use std::str::FromStr;

use crate::error::{CoolCvsError, Result};
use crate::hash::Hash;
use crate::store::RefStore;

pub const HEADS_DIR: &str = "heads";
pub const TAGS_DIR: &str = "tags";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub commit: Hash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub commit: Hash,
}

/// The current position pointer: exactly one of symbolic or detached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    Symbolic(String),
    Detached(Hash),
}

impl Head {
    fn serialize(&self) -> Vec<u8> {
        match self {
            Head::Symbolic(branch) => format!("ref: {HEADS_DIR}/{branch}").into_bytes(),
            Head::Detached(hash) => hash.to_hex().into_bytes(),
        }
    }

    fn deserialize(bytes: &[u8]) -> Result<Self> {
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|e| CoolCvsError::Corrupt(format!("invalid utf-8 in HEAD: {e}")))?;
        let text = text.trim();

        if let Some(rest) = text.strip_prefix("ref: ") {
            let branch = rest
                .strip_prefix(&format!("{HEADS_DIR}/"))
                .ok_or_else(|| CoolCvsError::Corrupt(format!("malformed HEAD ref: {rest}")))?;
            Ok(Head::Symbolic(branch.to_string()))
        } else {
            Ok(Head::Detached(Hash::from_str(text)?))
        }
    }
}

pub fn read_branch(refs: &RefStore, name: &str) -> Result<Branch> {
    let bytes = refs.get_ref(HEADS_DIR, name).map_err(|e| match e {
        CoolCvsError::NotFound(_) => CoolCvsError::NotFound(format!("branch '{name}' not found")),
        other => other,
    })?;
    let hex = String::from_utf8(bytes)
        .map_err(|e| CoolCvsError::Corrupt(format!("invalid utf-8 in branch ref: {e}")))?;
    let commit = Hash::from_str(hex.trim())?;
    Ok(Branch {
        name: name.to_string(),
        commit,
    })
}

pub fn write_branch(refs: &RefStore, branch: &Branch) -> Result<()> {
    refs.put_ref(HEADS_DIR, &branch.name, branch.commit.to_hex().as_bytes())
}

pub fn delete_branch(refs: &RefStore, name: &str) -> Result<()> {
    refs.delete_ref(HEADS_DIR, name)
}

pub fn list_branches(refs: &RefStore) -> Result<Vec<String>> {
    refs.list(HEADS_DIR)
}

pub fn read_tag(refs: &RefStore, name: &str) -> Result<Tag> {
    let bytes = refs.get_ref(TAGS_DIR, name).map_err(|e| match e {
        CoolCvsError::NotFound(_) => CoolCvsError::NotFound(format!("tag '{name}' not found")),
        other => other,
    })?;
    let hex = String::from_utf8(bytes)
        .map_err(|e| CoolCvsError::Corrupt(format!("invalid utf-8 in tag ref: {e}")))?;
    let commit = Hash::from_str(hex.trim())?;
    Ok(Tag {
        name: name.to_string(),
        commit,
    })
}

pub fn write_tag(refs: &RefStore, tag: &Tag) -> Result<()> {
    if refs.ref_exists(TAGS_DIR, &tag.name) {
        return Err(CoolCvsError::InvalidState(format!(
            "tag '{}' already exists",
            tag.name
        )));
    }
    refs.put_ref(TAGS_DIR, &tag.name, tag.commit.to_hex().as_bytes())
}

pub fn delete_tag(refs: &RefStore, name: &str) -> Result<()> {
    refs.delete_ref(TAGS_DIR, name)
}

pub fn list_tags(refs: &RefStore) -> Result<Vec<String>> {
    refs.list(TAGS_DIR)
}

pub fn read_head(refs: &RefStore) -> Result<Head> {
    let bytes = refs.get_ref("", "HEAD")?;
    Head::deserialize(&bytes)
}

pub fn write_head(refs: &RefStore, head: &Head) -> Result<()> {
    refs.put_ref("", "HEAD", &head.serialize())
}

/// Resolve Head to the commit it currently points at, dereferencing a
/// symbolic Head through its branch.
pub fn resolve_head_commit(refs: &RefStore, head: &Head) -> Result<Hash> {
    match head {
        Head::Symbolic(branch) => Ok(read_branch(refs, branch)?.commit),
        Head::Detached(hash) => Ok(*hash),
    }
}

/// The branch Head currently names, or `InvalidState` if Head is
/// detached.
pub fn branch_from_head(head: &Head) -> Result<&str> {
    match head {
        Head::Symbolic(branch) => Ok(branch.as_str()),
        Head::Detached(_) => Err(CoolCvsError::InvalidState(
            "HEAD is detached, not on a branch".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(tag: &str) -> Hash {
        Hash::digest_tagged("commit", &[tag.as_bytes()])
    }

    #[test]
    fn head_symbolic_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let refs = RefStore::new(temp.path().to_path_buf());

        write_head(&refs, &Head::Symbolic("master".into())).unwrap();
        assert_eq!(read_head(&refs).unwrap(), Head::Symbolic("master".into()));
    }

    #[test]
    fn head_detached_roundtrip() {
        let temp = tempfile::tempdir().unwrap();
        let refs = RefStore::new(temp.path().to_path_buf());

        let commit = hash("a");
        write_head(&refs, &Head::Detached(commit)).unwrap();
        assert_eq!(read_head(&refs).unwrap(), Head::Detached(commit));
    }

    #[test]
    fn resolve_head_dereferences_branch() {
        let temp = tempfile::tempdir().unwrap();
        let refs = RefStore::new(temp.path().to_path_buf());

        let commit = hash("a");
        write_branch(
            &refs,
            &Branch {
                name: "master".into(),
                commit,
            },
        )
        .unwrap();
        write_head(&refs, &Head::Symbolic("master".into())).unwrap();

        assert_eq!(
            resolve_head_commit(&refs, &read_head(&refs).unwrap()).unwrap(),
            commit
        );
    }

    #[test]
    fn branch_from_head_errors_on_detached() {
        assert!(branch_from_head(&Head::Detached(hash("a"))).is_err());
    }

    #[test]
    fn duplicate_tag_is_invalid_state() {
        let temp = tempfile::tempdir().unwrap();
        let refs = RefStore::new(temp.path().to_path_buf());

        let tag = Tag {
            name: "v1".into(),
            commit: hash("a"),
        };
        write_tag(&refs, &tag).unwrap();
        let err = write_tag(&refs, &tag).unwrap_err();
        assert!(matches!(err, CoolCvsError::InvalidState(_)));
    }
}
