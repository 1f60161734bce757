//! Stage 2: Normalizing a parsed document
//!
//! A definition document maps package names to versions to version records.
//! YAML happily produces keys that are not strings (`1.0:` is a float), so
//! every package and version key is rewritten to its canonical string before
//! the document is merged. Records that are not mappings, and records
//! without a `full_name`, are dropped and reported. YAML tags (`!custom foo`)
//! are stripped down to the value they wrap, since the cache has no way to
//! store them.
//!
//! Normalizing an already normalized document changes nothing.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use serde_yaml::{Mapping, Value};

use super::{PackageVersions, VersionRecord};
use crate::config::MissingNamePolicy;
use crate::diagnostics::Diagnostic;

/// Field every version record must carry.
pub const FULL_NAME: &str = "full_name";

/// The packages of one document, ready to merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedDocument {
    pub packages: BTreeMap<String, PackageVersions>,
    /// `full_name` to package name, one entry per surviving record.
    pub name_map: BTreeMap<String, String>,
    /// Entries dropped while normalizing.
    pub failures: Vec<Diagnostic>,
}

impl NormalizedDocument {
    /// Converts back to a YAML mapping with string keys.
    pub fn into_mapping(self) -> Mapping {
        self.packages
            .into_iter()
            .map(|(package, versions)| {
                let versions: Mapping = versions
                    .into_iter()
                    .map(|(version, record)| (Value::String(version), Value::Mapping(record)))
                    .collect();
                (Value::String(package), Value::Mapping(versions))
            })
            .collect()
    }
}

/// Canonical string form of a package or version key.
///
/// Strings are kept as they are. Numbers use their YAML display form, so
/// `1.0` becomes `"1.0"` and `10` becomes `"10"`. Booleans become
/// `true`/`false` and null becomes `~`. Sequences and mappings have no
/// canonical form.
pub fn canonical_key(key: &Value) -> Option<String> {
    match key {
        Value::Null => Some("~".to_string()),
        other => scalar_text(other),
    }
}

/// The record's `full_name`, if it is a scalar.
pub fn full_name(record: &VersionRecord) -> Option<String> {
    record.get(FULL_NAME).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Replaces every tagged value in `value` with the value it wraps, keys
/// included.
pub fn strip_tags(value: Value) -> Value {
    match value {
        Value::Tagged(tagged) => strip_tags(tagged.value),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(strip_tags).collect()),
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| (strip_tags(key), strip_tags(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Normalizes one parsed document. `path` is only used for diagnostics.
pub fn normalize(path: &Path, document: Mapping, policy: MissingNamePolicy) -> NormalizedDocument {
    let mut normalized = NormalizedDocument::default();
    let mut missing_names = false;

    for (package_key, versions) in document {
        let Some(package) = canonical_key(&package_key) else {
            normalized.failures.push(Diagnostic::ValidationFailure {
                path: path.to_path_buf(),
                package: describe(&package_key),
                version: None,
                detail: "package name is not a scalar".to_string(),
            });
            continue;
        };

        let Value::Mapping(versions) = strip_tags(versions) else {
            normalized.failures.push(Diagnostic::ValidationFailure {
                path: path.to_path_buf(),
                package,
                version: None,
                detail: "versions are not a mapping".to_string(),
            });
            continue;
        };

        let declared = versions.len();
        let mut kept = PackageVersions::new();
        // version -> full_name of the record kept for it
        let mut names: BTreeMap<String, String> = BTreeMap::new();

        for (version_key, record) in versions {
            let Some(version) = canonical_key(&version_key) else {
                normalized.failures.push(Diagnostic::ValidationFailure {
                    path: path.to_path_buf(),
                    package: package.clone(),
                    version: Some(describe(&version_key)),
                    detail: "version is not a scalar".to_string(),
                });
                continue;
            };

            let Value::Mapping(record) = record else {
                normalized.failures.push(Diagnostic::ValidationFailure {
                    path: path.to_path_buf(),
                    package: package.clone(),
                    version: Some(version),
                    detail: "version record is not a mapping".to_string(),
                });
                continue;
            };

            let Some(name) = full_name(&record) else {
                missing_names = true;
                normalized.failures.push(Diagnostic::MissingRequiredField {
                    path: path.to_path_buf(),
                    package: package.clone(),
                    version,
                    field: FULL_NAME.to_string(),
                });
                continue;
            };

            if kept.insert(version.clone(), record).is_some() {
                warn!(
                    "{}: {} declares version {} more than once, keeping the last",
                    path.display(),
                    package,
                    version
                );
            }
            names.insert(version, name);
        }

        // A package that lost every version to failures is dropped, but an
        // explicitly empty one is kept.
        if kept.is_empty() && declared > 0 {
            continue;
        }

        if normalized.packages.insert(package.clone(), kept).is_some() {
            warn!(
                "{}: package {} is declared more than once, keeping the last",
                path.display(),
                package
            );
            normalized.name_map.retain(|_, owner| *owner != package);
        }
        for name in names.into_values() {
            normalized.name_map.insert(name, package.clone());
        }
    }

    if missing_names && policy == MissingNamePolicy::RejectDocument {
        normalized.packages.clear();
        normalized.name_map.clear();
    }

    normalized
}

/// Short rendering of a key for diagnostics.
fn describe(value: &Value) -> String {
    serde_yaml::to_string(value)
        .map(|s| s.trim().replace('\n', " "))
        .unwrap_or_else(|_| "<unprintable>".to_string())
}
