//! # Diagnostics and Progress Events
//!
//! Recoverable failures are values, not errors. Every scan or sync step that
//! can fail for a single item (one document, one version record, one sync
//! parameter) produces a [`Diagnostic`] and carries on with the next item.
//!
//! Diagnostics are returned in the operation's report and, as they happen,
//! handed to an [`EventSink`] as a [`ProgressEvent`]. The sink is passed into
//! each operation explicitly, so callers decide where events go: the CLI logs
//! them, tests collect them in a [`MemorySink`].

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use log::debug;
use serde::{Deserialize, Serialize};

/// A recoverable failure recorded during a scan or sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A definition document is not valid YAML, or its root is not a mapping.
    ParseFailure { path: PathBuf, detail: String },

    /// A definition document or directory could not be read.
    ReadFailure { path: PathBuf, detail: String },

    /// A package or version entry has the wrong shape and was dropped.
    ValidationFailure {
        path: PathBuf,
        package: String,
        version: Option<String>,
        detail: String,
    },

    /// A version record lacks a required field.
    MissingRequiredField {
        path: PathBuf,
        package: String,
        version: String,
        field: String,
    },

    /// A sync entry or one of its `key=value` parameters is malformed.
    ConfigFormatError { entry: String, detail: String },

    /// A sync entry carries a parameter nobody understands.
    UnrecognizedParameter { entry: String, key: String },
}

impl Diagnostic {
    /// The progress event reported for this diagnostic.
    pub fn to_event(&self) -> ProgressEvent {
        ProgressEvent {
            error: self.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ParseFailure { path, detail } => {
                write!(f, "Failed to compile {}: {}", path.display(), detail)
            }
            Diagnostic::ReadFailure { path, detail } => {
                write!(f, "Failed to read {}: {}", path.display(), detail)
            }
            Diagnostic::ValidationFailure {
                path,
                package,
                version,
                detail,
            } => match version {
                Some(version) => write!(
                    f,
                    "Failed to compile {}: {} {}: {}",
                    path.display(),
                    package,
                    version,
                    detail
                ),
                None => write!(f, "Failed to compile {}: {}: {}", path.display(), package, detail),
            },
            Diagnostic::MissingRequiredField {
                path,
                package,
                version,
                field,
            } => write!(
                f,
                "Failed to compile {}: {} {} is missing required field '{}'",
                path.display(),
                package,
                version,
                field
            ),
            Diagnostic::ConfigFormatError { entry, detail } => {
                write!(f, "Incorrectly formatted sync entry '{}': {}", entry, detail)
            }
            Diagnostic::UnrecognizedParameter { entry, key } => {
                write!(f, "Unrecognized extra parameter '{}' in '{}'", key, entry)
            }
        }
    }
}

/// The structured message emitted for every recoverable failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub error: String,
}

impl ProgressEvent {
    /// Tag under which progress events are published. [`LogSink`] prefixes
    /// every line with it.
    pub const TAG: &'static str = "progress";
}

/// Receives progress events as an operation runs.
pub trait EventSink: Send + Sync {
    fn fire_event(&self, event: ProgressEvent);

    /// Convenience wrapper for reporting a diagnostic.
    fn report(&self, diagnostic: &Diagnostic) {
        self.fire_event(diagnostic.to_event());
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn fire_event(&self, event: ProgressEvent) {
        debug!(target: "winrepo::progress", "{}: {}", ProgressEvent::TAG, event.error);
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn fire_event(&self, event: ProgressEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
