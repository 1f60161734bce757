//! Parsing of sync entries.
//!
//! An entry is one whitespace-separated line:
//!
//! ```text
//! <revision> <locator> [key=value ...]
//! ```
//!
//! The only recognized parameter is `root`, a subpath of the synced tree to
//! expose instead of the whole checkout.

use std::path::{Component, Path, PathBuf};

use log::{error, warn};

use crate::diagnostics::Diagnostic;

const DELIMITER: char = '=';

/// One configured source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEntry {
    pub revision: String,
    /// URL or path of the source tree.
    pub locator: String,
    /// Subpath of the tree to expose, if any.
    pub root: Option<String>,
    /// Directory and link name, from the locator's last path segment.
    pub name: String,
}

/// Result of parsing one configured line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    /// The entry, or the diagnostic explaining why the line is unusable.
    pub entry: Result<SyncEntry, Diagnostic>,
    /// Problems with individual parameters; the entry is still usable.
    pub warnings: Vec<Diagnostic>,
}

impl SyncEntry {
    /// Parses a configured line. Bad parameters are skipped and reported;
    /// only a line without a revision and locator is unusable.
    pub fn parse(line: &str) -> ParsedEntry {
        let raw = line.trim();
        let mut fields = raw.split_whitespace();
        let mut warnings = Vec::new();

        let (Some(revision), Some(locator)) = (fields.next(), fields.next()) else {
            return ParsedEntry {
                entry: Err(format_error(raw, "expected '<revision> <locator> [key=value ...]'")),
                warnings,
            };
        };

        if let Some(field) = [revision, locator].into_iter().find(|f| f.starts_with('-')) {
            return ParsedEntry {
                entry: Err(format_error(raw, &format!("'{}' must not start with '-'", field))),
                warnings,
            };
        }

        let Some(name) = target_name(locator) else {
            return ParsedEntry {
                entry: Err(format_error(
                    raw,
                    &format!("cannot derive a name from locator '{}'", locator),
                )),
                warnings,
            };
        };

        let mut root = None;
        for param in fields {
            let Some((key, value)) = split_key_value(param) else {
                error!(
                    "Incorrectly formatted extra parameter. Missing '{}': {}",
                    DELIMITER, param
                );
                warnings.push(format_error(
                    raw,
                    &format!("parameter '{}' is missing '{}'", param, DELIMITER),
                ));
                continue;
            };

            match key {
                "root" if value.is_empty() => root = None,
                "root" => {
                    if is_relative_subpath(value) {
                        root = Some(value.to_string());
                    } else {
                        error!("Ignoring root '{}': must be a relative path inside the tree", value);
                        warnings.push(format_error(
                            raw,
                            &format!("root '{}' must be a relative path inside the tree", value),
                        ));
                    }
                }
                _ => {
                    warn!("Unrecognized extra parameter: {}", key);
                    warnings.push(Diagnostic::UnrecognizedParameter {
                        entry: raw.to_string(),
                        key: key.to_string(),
                    });
                }
            }
        }

        ParsedEntry {
            entry: Ok(SyncEntry {
                revision: revision.to_string(),
                locator: locator.to_string(),
                root,
                name: name.to_string(),
            }),
            warnings,
        }
    }

    /// Where the tree is checked out.
    pub fn checkout_dir(&self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(&self.name)
    }

    /// What the overlay link points at: the checkout, or its `root` subpath.
    pub fn link_target(&self, cache_dir: &Path) -> PathBuf {
        let checkout = self.checkout_dir(cache_dir);
        match &self.root {
            Some(root) => checkout.join(root),
            None => checkout,
        }
    }
}

/// Splits `key=value` at the first delimiter. The value may contain more.
pub fn split_key_value(param: &str) -> Option<(&str, &str)> {
    param.split_once(DELIMITER)
}

/// Last `/`-separated segment of a locator, ignoring trailing slashes.
pub fn target_name(locator: &str) -> Option<&str> {
    let name = locator.trim_end_matches('/').rsplit('/').next()?;
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}

fn is_relative_subpath(value: &str) -> bool {
    Path::new(value)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn format_error(entry: &str, detail: &str) -> Diagnostic {
    Diagnostic::ConfigFormatError {
        entry: entry.to_string(),
        detail: detail.to_string(),
    }
}
