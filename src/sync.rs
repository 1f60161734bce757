//! # Source Sync Driver
//!
//! Keeps the definition tree fed from external source trees. For every
//! configured sync entry the driver:
//!
//! 1. parses the entry line ([`entry`]),
//! 2. asks the [`SourceControl`] collaborator to bring
//!    `git_cache_dir/<name>` to the pinned revision, discarding local changes,
//! 3. links `repo_root/<name>` to the checkout (or its `root` subpath) so the
//!    next genrepo scan picks the definitions up ([`overlay`]).
//!
//! Every entry needs its own name, since the name picks both the checkout
//! directory and the link. A later entry whose name is already taken fails
//! before any sync work starts.
//!
//! A failing entry is recorded in the [`SyncReport`] and never stops the
//! others. With `parallel` set, step 2 runs on the rayon pool; links are still
//! created one at a time in configuration order.

pub mod entry;
pub mod overlay;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::WinRepoConfig;
use crate::diagnostics::{Diagnostic, EventSink};
use crate::error::Result;
use crate::vcs::SourceControl;

pub use entry::SyncEntry;

/// What happened to one sync entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Directory and link name of the tree.
    pub name: String,
    /// The overlay link path.
    pub target: PathBuf,
    pub revision: String,
    pub result: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Results of a sync pass, keyed by source locator.
///
/// Entries that could not be parsed are keyed by their trimmed line, as are
/// entries that repeat an earlier locator with a name already taken.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub outcomes: BTreeMap<String, SyncOutcome>,
    pub diagnostics: Vec<Diagnostic>,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.result).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn all_ok(&self) -> bool {
        self.failed() == 0
    }
}

/// Synchronizes every entry in `config.git_repos` and links it into the
/// repository root.
pub fn update_git_repos(
    config: &WinRepoConfig,
    vcs: &dyn SourceControl,
    sink: &dyn EventSink,
) -> SyncReport {
    let mut report = SyncReport::default();
    let mut entries: Vec<SyncEntry> = Vec::new();
    // name -> locator of the entry that claimed it
    let mut claimed: BTreeMap<String, String> = BTreeMap::new();

    for line in &config.git_repos {
        let parsed = SyncEntry::parse(line);
        for warning in parsed.warnings {
            sink.report(&warning);
            report.diagnostics.push(warning);
        }
        let entry = match parsed.entry {
            Ok(entry) => entry,
            Err(diagnostic) => {
                reject(&mut report, sink, line.trim().to_string(), None, diagnostic);
                continue;
            }
        };

        if let Some(owner) = claimed.get(&entry.name) {
            let diagnostic = Diagnostic::ConfigFormatError {
                entry: line.trim().to_string(),
                detail: format!("name '{}' is already used by {}", entry.name, owner),
            };
            let key = if entries.iter().any(|e| e.locator == entry.locator) {
                line.trim().to_string()
            } else {
                entry.locator.clone()
            };
            reject(&mut report, sink, key, Some(&entry), diagnostic);
            continue;
        }

        claimed.insert(entry.name.clone(), entry.locator.clone());
        entries.push(entry);
    }

    if entries.is_empty() {
        return report;
    }

    let cache_dir = absolute(&config.git_cache_dir);
    let synced: Vec<Result<()>> = if config.parallel {
        entries
            .par_iter()
            .map(|entry| sync_entry(vcs, entry, &cache_dir))
            .collect()
    } else {
        entries
            .iter()
            .map(|entry| sync_entry(vcs, entry, &cache_dir))
            .collect()
    };

    if !config.repo_root.exists() {
        if let Err(e) = fs::create_dir_all(&config.repo_root) {
            error!(
                "Failed to create repository root {}: {}",
                config.repo_root.display(),
                e
            );
        }
    }

    for (entry, synced) in entries.into_iter().zip(synced) {
        let link = config.repo_root.join(&entry.name);
        let linked = synced.and_then(|()| {
            overlay::create_link(&link, &entry.link_target(&cache_dir), config.link_policy)
        });

        let error = match linked {
            Ok(()) => {
                info!("{} linked at {}", entry.locator, link.display());
                None
            }
            Err(e) => {
                error!("Failed to update {}: {}", entry.locator, e);
                Some(e.to_string())
            }
        };

        report.outcomes.insert(
            entry.locator,
            SyncOutcome {
                name: entry.name,
                target: link,
                revision: entry.revision,
                result: error.is_none(),
                error,
            },
        );
    }

    report
}

/// Records an entry that fails before any sync work.
fn reject(
    report: &mut SyncReport,
    sink: &dyn EventSink,
    key: String,
    entry: Option<&SyncEntry>,
    diagnostic: Diagnostic,
) {
    error!("{}", diagnostic);
    sink.report(&diagnostic);
    report.outcomes.insert(
        key,
        SyncOutcome {
            name: entry.map(|e| e.name.clone()).unwrap_or_default(),
            target: PathBuf::new(),
            revision: entry.map(|e| e.revision.clone()).unwrap_or_default(),
            result: false,
            error: Some(diagnostic.to_string()),
        },
    );
    report.diagnostics.push(diagnostic);
}

fn sync_entry(vcs: &dyn SourceControl, entry: &SyncEntry, cache_dir: &Path) -> Result<()> {
    let checkout = entry.checkout_dir(cache_dir);
    debug!(
        "Syncing {}@{} into {}",
        entry.locator,
        entry.revision,
        checkout.display()
    );
    vcs.sync(&entry.locator, &entry.revision, &checkout, true)
}

// Link targets are resolved against the link's directory, so they must not
// stay relative to the working directory.
fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
