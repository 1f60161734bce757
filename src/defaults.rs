//! Default values for winrepo configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// File extension of package definition documents.
pub const DOCUMENT_EXTENSION: &str = "sls";

/// File name of the binary repository cache, relative to the repository root.
pub const CACHE_FILE: &str = "winrepo.p";

/// File name of the configuration file looked up in the current directory.
pub const CONFIG_FILE: &str = "winrepo.yaml";

/// The community package definition repository, tracked at `master`.
pub const GIT_REPO: &str = "master https://github.com/saltstack/salt-winrepo.git";

/// Returns the default repository root holding the definition tree.
pub fn default_repo_root() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\salt\srv\salt\win\repo")
    } else {
        PathBuf::from("/srv/salt/win/repo")
    }
}

/// Returns the default directory where synced source trees are checked out.
///
/// Uses the platform-appropriate cache directory:
/// - Linux: `~/.cache/winrepo` (XDG Base Directory)
/// - macOS: `~/Library/Caches/winrepo`
/// - Windows: `{FOLDERID_LocalAppData}\winrepo`
///
/// Falls back to `.winrepo-cache` in the current directory if the
/// platform cache directory cannot be determined.
pub fn default_git_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".winrepo-cache"))
        .join("winrepo")
}

/// Returns the default list of sync entries.
pub fn default_git_repos() -> Vec<String> {
    vec![GIT_REPO.to_string()]
}
