//! # Configuration Schema and Parsing
//!
//! This module defines [`WinRepoConfig`], the explicit configuration passed to
//! every winrepo operation, and the logic for loading it from a YAML file.
//!
//! The file keys follow the master configuration names the runner has always
//! used (`win_repo`, `win_repo_mastercachefile`, `win_gitrepos`,
//! `win_gitrepo_cachedir`). Shorter aliases are accepted as well:
//!
//! ```yaml
//! repo_root: /srv/salt/win/repo
//! cache_file: winrepo.p
//! git_repos:
//!   - "master https://github.com/saltstack/salt-winrepo.git"
//! git_cache_dir: /var/cache/winrepo
//! missing_full_name: skip-entry
//! link_policy: fail
//! ```
//!
//! Every key is optional; missing keys take the values from
//! [`crate::defaults`]. Unknown keys are rejected so that typos do not
//! silently fall back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

/// What to do with a version record that has no `full_name` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingNamePolicy {
    /// Drop the record, report it, and keep the rest of the document.
    #[default]
    SkipEntry,
    /// Drop the whole document the record came from.
    RejectDocument,
}

/// What to do when the overlay link path is already occupied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkPolicy {
    /// Fail the sync entry if anything exists at the link path.
    #[default]
    Fail,
    /// Replace an existing symbolic link. Real files and directories are
    /// never removed.
    Replace,
}

/// How the cache file is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteMode {
    /// Write a temporary file next to the target and rename it into place.
    #[default]
    Atomic,
    /// Truncate and write the target in place.
    Direct,
}

/// Configuration for genrepo and source sync runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WinRepoConfig {
    /// Root of the package definition tree. The cache file lives here too.
    #[serde(alias = "win_repo")]
    pub repo_root: PathBuf,

    /// Name of the cache file, relative to `repo_root`.
    #[serde(alias = "win_repo_mastercachefile")]
    pub cache_file: PathBuf,

    /// Sync entries, each `<revision> <locator> [key=value ...]`.
    #[serde(alias = "win_gitrepos")]
    pub git_repos: Vec<String>,

    /// Where synced source trees are checked out.
    #[serde(alias = "win_gitrepo_cachedir")]
    pub git_cache_dir: PathBuf,

    /// Extension (without the dot) of definition documents.
    pub document_extension: String,

    pub missing_full_name: MissingNamePolicy,

    pub link_policy: LinkPolicy,

    pub write_mode: WriteMode,

    /// Fetch sync entries concurrently.
    pub parallel: bool,
}

impl Default for WinRepoConfig {
    fn default() -> Self {
        Self {
            repo_root: defaults::default_repo_root(),
            cache_file: PathBuf::from(defaults::CACHE_FILE),
            git_repos: defaults::default_git_repos(),
            git_cache_dir: defaults::default_git_cache_dir(),
            document_extension: defaults::DOCUMENT_EXTENSION.to_string(),
            missing_full_name: MissingNamePolicy::default(),
            link_policy: LinkPolicy::default(),
            write_mode: WriteMode::default(),
            parallel: false,
        }
    }
}

impl WinRepoConfig {
    /// Configuration rooted at `repo_root`, everything else defaulted.
    pub fn with_repo_root(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            ..Self::default()
        }
    }

    /// Full path of the cache file.
    pub fn cache_path(&self) -> PathBuf {
        self.repo_root.join(&self.cache_file)
    }

    /// Suffix matched against document file names, including the dot.
    pub fn document_suffix(&self) -> String {
        format!(".{}", self.document_extension.trim_start_matches('.'))
    }
}

/// Parses a YAML string into a [`WinRepoConfig`].
///
/// An empty document (or one holding only comments) yields the defaults.
pub fn parse(yaml_content: &str) -> Result<WinRepoConfig> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml_content).map_err(|e| {
        Error::ConfigParse {
            message: e.to_string(),
            hint: None,
        }
    })?;

    if value.is_null() {
        return Ok(WinRepoConfig::default());
    }

    serde_yaml::from_value(value).map_err(|e| {
        let message = e.to_string();
        let hint = if message.contains("unknown field") {
            Some(
                "Supported keys are win_repo, win_repo_mastercachefile, win_gitrepos, \
                 win_gitrepo_cachedir, document_extension, missing_full_name, \
                 link_policy, write_mode and parallel"
                    .to_string(),
            )
        } else if message.contains("unknown variant") {
            Some(
                "missing_full_name takes skip-entry|reject-document, link_policy takes \
                 fail|replace, write_mode takes atomic|direct"
                    .to_string(),
            )
        } else {
            None
        };
        Error::ConfigParse { message, hint }
    })
}

/// Parse a [`WinRepoConfig`] from a YAML file path
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<WinRepoConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Loads the configuration for a command invocation.
///
/// An explicitly named file must exist. Without one, `winrepo.yaml` in the
/// current directory is used when present, and the defaults otherwise.
pub fn load(explicit: Option<&Path>) -> Result<WinRepoConfig> {
    match explicit {
        Some(path) => from_file(path),
        None => {
            let implicit = Path::new(defaults::CONFIG_FILE);
            if implicit.is_file() {
                from_file(implicit)
            } else {
                Ok(WinRepoConfig::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_master_config_keys() {
        let yaml = r#"
win_repo: /srv/salt/win/repo
win_repo_mastercachefile: cache.p
win_gitrepos:
  - "master https://github.com/saltstack/salt-winrepo.git"
  - "v1.2 https://example.com/org/extra.git root=defs"
win_gitrepo_cachedir: /var/cache/winrepo
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.repo_root, PathBuf::from("/srv/salt/win/repo"));
        assert_eq!(config.cache_file, PathBuf::from("cache.p"));
        assert_eq!(config.git_repos.len(), 2);
        assert_eq!(config.git_cache_dir, PathBuf::from("/var/cache/winrepo"));
        assert_eq!(config.cache_path(), PathBuf::from("/srv/salt/win/repo/cache.p"));
    }

    #[test]
    fn test_parse_short_keys_and_policies() {
        let yaml = r#"
repo_root: /tmp/repo
missing_full_name: reject-document
link_policy: replace
write_mode: direct
parallel: true
document_extension: yml
"#;
        let config = parse(yaml).unwrap();
        assert_eq!(config.repo_root, PathBuf::from("/tmp/repo"));
        assert_eq!(config.missing_full_name, MissingNamePolicy::RejectDocument);
        assert_eq!(config.link_policy, LinkPolicy::Replace);
        assert_eq!(config.write_mode, WriteMode::Direct);
        assert!(config.parallel);
        assert_eq!(config.document_suffix(), ".yml");
        // Unset keys keep their defaults
        assert_eq!(config.cache_file, PathBuf::from(defaults::CACHE_FILE));
    }

    #[test]
    fn test_parse_empty_document_yields_defaults() {
        let config = parse("# nothing configured yet\n").unwrap();
        assert_eq!(config, WinRepoConfig::default());
    }

    #[test]
    fn test_parse_unknown_key_has_hint() {
        let err = parse("win_rep: /srv\n").unwrap_err();
        let display = err.to_string();
        assert!(display.contains("unknown field"));
        assert!(display.contains("hint:"));
    }

    #[test]
    fn test_parse_unknown_policy_has_hint() {
        let err = parse("link_policy: overwrite\n").unwrap_err();
        let display = err.to_string();
        assert!(display.contains("hint:"));
        assert!(display.contains("fail|replace"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = parse("win_repo: [unclosed").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_document_suffix_tolerates_leading_dot() {
        let config = WinRepoConfig {
            document_extension: ".sls".to_string(),
            ..WinRepoConfig::default()
        };
        assert_eq!(config.document_suffix(), ".sls");
    }

    #[test]
    fn test_from_file_and_load_explicit() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("winrepo.yaml");
        fs::write(&path, "win_repo: /opt/repo\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.repo_root, PathBuf::from("/opt/repo"));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let err = load(Some(&temp.path().join("absent.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_with_repo_root() {
        let config = WinRepoConfig::with_repo_root("/data/repo");
        assert_eq!(config.cache_path(), PathBuf::from("/data/repo/winrepo.p"));
        assert_eq!(config.link_policy, LinkPolicy::Fail);
    }
}
