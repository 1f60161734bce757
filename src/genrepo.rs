//! The genrepo pipeline: compile package definition documents into the
//! repository cache.
//!
//! ## Overview
//!
//! A rebuild runs four stages over the definition tree:
//! 1. Loading - Read one `.sls` document and parse it as YAML ([`load`])
//! 2. Normalizing - Canonicalize package and version keys, drop malformed
//!    entries and collect `full_name` reverse lookups ([`normalize`])
//! 3. Aggregating - Walk the tree and merge every document into one
//!    [`RepositoryIndex`] ([`aggregate`])
//! 4. Writing - Serialize the index to the cache file ([`write`])
//!
//! Stages 1 and 2 never fail the rebuild: a broken document or record turns
//! into a [`Diagnostic`] and the scan moves on. Only I/O failures on the
//! repository root or the cache file abort [`run`].

pub mod aggregate;
pub mod load;
pub mod normalize;
pub mod write;

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::WinRepoConfig;
use crate::diagnostics::{Diagnostic, EventSink};
use crate::error::Result;

pub use aggregate::aggregate;
pub use normalize::NormalizedDocument;
pub use write::WriteSummary;

/// Metadata for one version of one package.
pub type VersionRecord = serde_yaml::Mapping;

/// All versions of one package, keyed by canonical version string.
pub type PackageVersions = BTreeMap<String, VersionRecord>;

/// The merged result of scanning every definition document.
///
/// Both sections are always present, as empty maps when nothing was found.
/// Ordered maps keep the encoded cache file stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryIndex {
    /// Package name to versions.
    #[serde(default)]
    pub repo: BTreeMap<String, PackageVersions>,
    /// Installer display name (`full_name`) to package name.
    #[serde(default)]
    pub name_map: BTreeMap<String, String>,
}

impl RepositoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.repo.is_empty() && self.name_map.is_empty()
    }

    /// Merges one normalized document. Packages and names already present
    /// are overwritten; there is no per-version merge.
    pub fn merge(&mut self, document: NormalizedDocument) {
        self.repo.extend(document.packages);
        self.name_map.extend(document.name_map);
    }

    /// Drops reverse lookups that no longer match a record in `repo`.
    ///
    /// Needed after merging documents that redefine the same package: the
    /// overwritten versions may have carried names the winner doesn't have.
    pub fn prune_stale_names(&mut self) -> usize {
        let repo = &self.repo;
        let before = self.name_map.len();
        self.name_map.retain(|full_name, package| {
            repo.get(package).is_some_and(|versions| {
                versions
                    .values()
                    .any(|record| normalize::full_name(record).as_deref() == Some(full_name))
            })
        });
        before - self.name_map.len()
    }

    pub fn package(&self, name: &str) -> Option<&PackageVersions> {
        self.repo.get(name)
    }

    /// Package name registered for an installer display name.
    pub fn package_for_full_name(&self, full_name: &str) -> Option<&str> {
        self.name_map.get(full_name).map(String::as_str)
    }

    /// Total number of version records across all packages.
    pub fn version_count(&self) -> usize {
        self.repo.values().map(BTreeMap::len).sum()
    }
}

/// Outcome of walking the definition tree.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub index: RepositoryIndex,
    /// Every recoverable problem met during the walk, in walk order.
    pub diagnostics: Vec<Diagnostic>,
    /// Definition documents found.
    pub documents_scanned: usize,
    /// Documents that contributed at least one package.
    pub documents_merged: usize,
}

/// Outcome of a full rebuild.
#[derive(Debug, Clone, Serialize)]
pub struct GenRepoReport {
    pub scan: ScanReport,
    pub written: WriteSummary,
}

/// Rebuilds the cache file: walks `config.repo_root`, merges every
/// definition document and writes the result to [`WinRepoConfig::cache_path`].
pub fn run(config: &WinRepoConfig, sink: &dyn EventSink) -> Result<GenRepoReport> {
    let scan = aggregate(config, sink)?;
    let written = write::write(&scan.index, &config.cache_path(), config.write_mode)?;

    info!(
        "Compiled {} packages ({} versions) from {} documents into {} ({} problems)",
        scan.index.repo.len(),
        scan.index.version_count(),
        scan.documents_scanned,
        written.path.display(),
        scan.diagnostics.len()
    );

    Ok(GenRepoReport { scan, written })
}
