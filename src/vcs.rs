//! # Source Control Collaborator
//!
//! The sync driver does not know how source trees are fetched. It asks a
//! [`SourceControl`] implementation to put a tree at a revision into a
//! directory, and only cares whether that worked.
//!
//! [`GitSourceControl`] is the real implementation, backed by the system
//! `git` command (see [`crate::git`]). Tests substitute their own
//! implementation to simulate failures without touching the network.

use std::path::Path;

use crate::error::Result;

/// Materializes an external source tree at a pinned revision.
pub trait SourceControl: Send + Sync {
    /// Fetches or updates `url` into `destination` and checks out `revision`.
    ///
    /// With `force`, local modifications in `destination` are discarded.
    fn sync(&self, url: &str, revision: &str, destination: &Path, force: bool) -> Result<()>;
}

/// [`SourceControl`] backed by the system `git` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitSourceControl;

impl SourceControl for GitSourceControl {
    fn sync(&self, url: &str, revision: &str, destination: &Path, force: bool) -> Result<()> {
        let commit = crate::git::sync_to_revision(url, revision, destination, force)?;
        log::info!("{} is at {} ({})", url, revision, commit);
        Ok(())
    }
}
