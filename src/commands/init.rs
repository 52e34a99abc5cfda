//! # Init Command
//!
//! Initialize a new cool_cvs repository.
//!
//! ## What it does
//!
//! Creates the `.cool_cvs` directory structure:
//!
//! ```text
//! .cool_cvs/
//! ├── HEAD           # "ref: heads/master"
//! ├── objects/       # Content-addressed object store
//! ├── index/         # Reserved; the index itself is in-memory only
//! └── refs/
//!     ├── heads/     # Branch references
//!     └── tags/      # Tag references
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cool_cvs init
//! cool_cvs init /path/to/repo
//! ```

use std::path::Path;

use anyhow::Result;

use crate::Repository;

/// Execute the init command.
pub fn run(path: Option<&Path>) -> Result<()> {
    let target = path.unwrap_or_else(|| Path::new("."));
    Repository::init(target)?;
    println!("initialized empty cool_cvs repository in {}", target.display());
    Ok(())
}
