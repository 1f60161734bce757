//! # winrepo
//!
//! Builds and maintains the package repository index used by a Windows
//! software package manager.
//!
//! Package definitions are YAML documents (`*.sls`) mapping a package name to
//! its versions, each version carrying installer metadata and a `full_name`:
//!
//! ```yaml
//! firefox:
//!   '115.0':
//!     full_name: Mozilla Firefox
//!     installer: https://example.com/firefox-115.0.exe
//!     install_flags: -ms
//! ```
//!
//! ## Quick Example
//!
//! ```
//! use winrepo::config::WinRepoConfig;
//! use winrepo::diagnostics::MemorySink;
//! use winrepo::genrepo;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(
//!     dir.path().join("firefox.sls"),
//!     "firefox:\n  '115.0':\n    full_name: Mozilla Firefox\n",
//! )
//! .unwrap();
//!
//! let config = WinRepoConfig::with_repo_root(dir.path());
//! let report = genrepo::run(&config, &MemorySink::new()).unwrap();
//!
//! assert_eq!(report.scan.index.package_for_full_name("Mozilla Firefox"), Some("firefox"));
//! assert!(dir.path().join("winrepo.p").exists());
//! ```
//!
//! ## Modules
//!
//! - **`genrepo`**: scans the definition tree and writes the cache file. Split
//!   into stages: `load` (read and parse one document), `normalize` (canonical
//!   keys, record validation), `aggregate` (walk and merge) and `write`
//!   (MessagePack encoding).
//! - **`sync`**: fetches external definition trees at pinned revisions and
//!   links them into the repository root, through the [`vcs::SourceControl`]
//!   seam. [`git`] holds the `git` command wrappers behind it.
//! - **`diagnostics`**: recoverable failures and the [`diagnostics::EventSink`]
//!   they are reported to.
//! - **`config`** and **`defaults`**: the explicit configuration every
//!   operation receives.
//! - **`error`**: fatal errors.

pub mod config;
pub mod defaults;
pub mod diagnostics;
pub mod error;
pub mod genrepo;
pub mod git;
pub mod output;
pub mod sync;
pub mod vcs;
