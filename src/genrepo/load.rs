//! Stage 1: Loading a definition document
//!
//! Reads one `.sls` file and parses it into a YAML mapping. Loading never
//! fails the scan: unreadable files and YAML errors come back as a
//! [`LoadOutcome::Failed`] carrying the diagnostic to report.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::diagnostics::Diagnostic;

/// Result of loading one definition document.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The document parsed to a non-empty mapping.
    Parsed(Mapping),
    /// The document holds nothing (blank, comments only, or a falsy value).
    Empty,
    /// The document could not be read or parsed.
    Failed(Diagnostic),
}

/// Reads and parses the document at `path`.
pub fn load(path: &Path) -> LoadOutcome {
    match fs::read_to_string(path) {
        Ok(content) => parse_document(path, &content),
        Err(e) => LoadOutcome::Failed(Diagnostic::ReadFailure {
            path: path.to_path_buf(),
            detail: e.to_string(),
        }),
    }
}

/// Parses document text. `path` is only used for diagnostics.
pub fn parse_document(path: &Path, content: &str) -> LoadOutcome {
    if has_no_content(content) {
        return LoadOutcome::Empty;
    }

    let value: Value = match serde_yaml::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            return LoadOutcome::Failed(Diagnostic::ParseFailure {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })
        }
    };

    if is_empty_document(&value) {
        return LoadOutcome::Empty;
    }

    match value {
        Value::Mapping(mapping) => LoadOutcome::Parsed(mapping),
        Value::Tagged(tagged) => match tagged.value {
            Value::Mapping(mapping) => LoadOutcome::Parsed(mapping),
            _ => root_not_a_mapping(path),
        },
        _ => root_not_a_mapping(path),
    }
}

/// Whether a parsed document contributes nothing.
///
/// Null, `false`, zero, the empty string and empty collections all count as
/// empty documents.
pub fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        Value::Tagged(tagged) => is_empty_document(&tagged.value),
    }
}

/// Blank lines, comments and bare document markers only.
fn has_no_content(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn root_not_a_mapping(path: &Path) -> LoadOutcome {
    LoadOutcome::Failed(Diagnostic::ParseFailure {
        path: path.to_path_buf(),
        detail: "document root is not a mapping".to_string(),
    })
}
