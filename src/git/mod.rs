//! Candidate file discovery
//!
//! Hooks are normally evaluated against files git knows about: the staged
//! set before a commit, every tracked file, or the files touched between two
//! revisions. Paths are always relative to the repository root with `/`
//! separators, which is what hook patterns are written against.

use anyhow::{Context, Result};
use git2::Repository;
use std::path::Path;

mod operations;
mod walk;

pub use walk::walk_files;

/// Git repository handle
pub struct GitRepo {
    pub(crate) repo: Repository,
}

impl GitRepo {
    /// Open the repository containing `path`
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path)
            .with_context(|| format!("No Git repository found at {}", path.display()))?;

        Ok(Self { repo })
    }

    /// Working directory root
    pub fn workdir(&self) -> Result<&Path> {
        self.repo
            .workdir()
            .context("Repository has no working directory")
    }
}

fn path_from_bytes(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).replace('\\', "/")
}
