//! Stage 3: Aggregating the definition tree
//!
//! Walks the repository root, loads and normalizes every definition document
//! and merges the results into one [`RepositoryIndex`](super::RepositoryIndex).
//!
//! ## Merge order
//!
//! Documents are visited in lexicographic file-name order at every level of
//! the tree. When two documents define the same package, or the same
//! `full_name`, the one visited last wins. Symbolic links are followed, so
//! trees exposed through overlay links are part of the walk.

use std::fs;
use std::path::Path;

use log::{debug, info};
use walkdir::WalkDir;

use super::load::{load, LoadOutcome};
use super::normalize::normalize;
use super::ScanReport;
use crate::config::WinRepoConfig;
use crate::diagnostics::{Diagnostic, EventSink};
use crate::error::Result;

/// Scans `config.repo_root` and builds the repository index.
///
/// The root is created when it does not exist yet, which yields an empty
/// index. Failing to create it is the only error; every per-document problem
/// is reported through `sink` and collected in the returned report.
pub fn aggregate(config: &WinRepoConfig, sink: &dyn EventSink) -> Result<ScanReport> {
    let root = &config.repo_root;
    if !root.exists() {
        info!("Creating repository root {}", root.display());
        fs::create_dir_all(root)?;
    }

    let suffix = config.document_suffix();
    let mut report = ScanReport::default();

    let walker = WalkDir::new(root).follow_links(true).sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root.as_path()).to_path_buf();
                record(
                    &mut report,
                    sink,
                    Diagnostic::ReadFailure {
                        path,
                        detail: e.to_string(),
                    },
                );
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_document(entry.path(), &suffix) {
            continue;
        }

        report.documents_scanned += 1;
        debug!("Compiling {}", entry.path().display());

        match load(entry.path()) {
            LoadOutcome::Empty => {
                debug!("{} is empty, skipping", entry.path().display());
            }
            LoadOutcome::Failed(diagnostic) => record(&mut report, sink, diagnostic),
            LoadOutcome::Parsed(document) => {
                let mut normalized = normalize(entry.path(), document, config.missing_full_name);
                for diagnostic in std::mem::take(&mut normalized.failures) {
                    record(&mut report, sink, diagnostic);
                }
                if !normalized.packages.is_empty() {
                    report.documents_merged += 1;
                }
                report.index.merge(normalized);
            }
        }
    }

    let pruned = report.index.prune_stale_names();
    if pruned > 0 {
        debug!("Dropped {} names shadowed by later documents", pruned);
    }

    Ok(report)
}

fn is_document(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

fn record(report: &mut ScanReport, sink: &dyn EventSink, diagnostic: Diagnostic) {
    sink.report(&diagnostic);
    report.diagnostics.push(diagnostic);
}
