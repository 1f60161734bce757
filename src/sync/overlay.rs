//! Overlay links from the repository root into synced trees.

use std::fs;
use std::io;
use std::path::Path;

use log::debug;

use crate::config::LinkPolicy;
use crate::error::{Error, Result};

/// Creates a directory symlink at `link` pointing to `target`.
///
/// An occupied `link` path fails under [`LinkPolicy::Fail`]. Under
/// [`LinkPolicy::Replace`] an existing symlink is swapped out, while a link
/// that already points at `target` is left alone. Real files and directories
/// are never removed.
pub fn create_link(link: &Path, target: &Path, policy: LinkPolicy) -> Result<()> {
    let link_error = |message: String| Error::Link {
        link: link.to_path_buf(),
        target: target.to_path_buf(),
        message,
    };

    match fs::symlink_metadata(link) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(link_error(e.to_string())),
        Ok(meta) => {
            if policy == LinkPolicy::Fail {
                return Err(link_error("link path already exists".to_string()));
            }
            if !meta.file_type().is_symlink() {
                return Err(link_error(
                    "link path exists and is not a symbolic link".to_string(),
                ));
            }
            if fs::read_link(link).is_ok_and(|current| current == target) {
                debug!("{} already points at {}", link.display(), target.display());
                return Ok(());
            }
            debug!("Replacing link {}", link.display());
            remove_link(link).map_err(|e| link_error(e.to_string()))?;
        }
    }

    symlink_dir(target, link).map_err(|e| link_error(e.to_string()))
}

fn remove_link(link: &Path) -> io::Result<()> {
    // Directory symlinks on Windows are removed with remove_dir
    fs::remove_file(link).or_else(|_| fs::remove_dir(link))
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_link_on_free_path() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("checkout");
        fs::create_dir(&target).unwrap();
        let link = temp.path().join("link");

        create_link(&link, &target, LinkPolicy::Fail).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), target);
    }

    #[test]
    fn test_fail_policy_rejects_existing_link() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("checkout");
        fs::create_dir(&target).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let err = create_link(&link, &target, LinkPolicy::Fail).unwrap_err();

        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_replace_policy_swaps_link() {
        let temp = TempDir::new().unwrap();
        let old = temp.path().join("old");
        let new = temp.path().join("new");
        fs::create_dir(&old).unwrap();
        fs::create_dir(&new).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&old, &link).unwrap();

        create_link(&link, &new, LinkPolicy::Replace).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), new);
    }

    #[test]
    fn test_replace_policy_keeps_matching_link() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("checkout");
        fs::create_dir(&target).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        create_link(&link, &target, LinkPolicy::Replace).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), target);
    }

    #[test]
    fn test_replace_policy_never_removes_real_directory() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("checkout");
        fs::create_dir(&target).unwrap();
        let link = temp.path().join("local-defs");
        fs::create_dir(&link).unwrap();
        fs::write(link.join("mine.sls"), "mine: {}\n").unwrap();

        let err = create_link(&link, &target, LinkPolicy::Replace).unwrap_err();

        assert!(matches!(err, Error::Link { .. }));
        assert!(link.join("mine.sls").exists());
    }

    #[test]
    fn test_dangling_link_counts_as_occupied() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(temp.path().join("gone"), &link).unwrap();
        let target = temp.path().join("checkout");
        fs::create_dir(&target).unwrap();

        assert!(create_link(&link, &target, LinkPolicy::Fail).is_err());
        create_link(&link, &target, LinkPolicy::Replace).unwrap();
        assert_eq!(fs::read_link(&link).unwrap(), target);
    }
}
