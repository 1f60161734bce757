//! # Error Handling
//!
//! This module defines the fatal error type for `winrepo`. It uses the
//! `thiserror` library to describe every failure that aborts an operation,
//! with enough context to explain what went wrong.
//!
//! Recoverable, per-item problems (a broken definition document, a malformed
//! version record, a bad sync parameter) are not errors in this sense. They
//! are modeled as [`crate::diagnostics::Diagnostic`] values and collected into
//! the operation's report instead.
//!
//! The variants cover:
//!
//! - Configuration file parsing.
//! - Git command execution and cloning.
//! - Overlay link creation.
//! - Cache file encoding, decoding, reading and writing.
//! - I/O errors.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for winrepo operations
#[derive(Error, Debug)]
pub enum Error {
    /// An error occurred while parsing the `winrepo.yaml` configuration file.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// An error occurred while cloning a Git repository.
    #[error("Git clone error for {url}@{r#ref}: {message}")]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
    },

    /// An error occurred while executing a Git command.
    #[error("Git command failed for {url}: {command} - {stderr}")]
    GitCommand {
        command: String,
        url: String,
        stderr: String,
    },

    /// The overlay link exposing a synced tree could not be created.
    #[error("Failed to link {} -> {}: {message}", link.display(), target.display())]
    Link {
        link: PathBuf,
        target: PathBuf,
        message: String,
    },

    /// The cache file could not be written.
    #[error("Failed to write cache file {}: {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file could not be read back.
    #[error("Failed to read cache file {}: {message}", path.display())]
    CacheRead { path: PathBuf, message: String },

    /// The repository index could not be encoded.
    #[error("Serialization error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The cache file content could not be decoded.
    #[error("Deserialization error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config_parse() {
        let error = Error::ConfigParse {
            message: "Invalid YAML".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration parsing error"));
        assert!(display.contains("Invalid YAML"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_config_parse_with_hint() {
        let error = Error::ConfigParse {
            message: "unknown field `win_rep`".to_string(),
            hint: Some("Did you mean 'win_repo'?".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("unknown field"));
        assert!(display.contains("hint:"));
        assert!(display.contains("win_repo"));
    }

    #[test]
    fn test_error_display_git_command() {
        let error = Error::GitCommand {
            command: "fetch".to_string(),
            url: "https://github.com/test/repo.git".to_string(),
            stderr: "Permission denied".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git command failed"));
        assert!(display.contains("fetch"));
        assert!(display.contains("Permission denied"));
    }

    #[test]
    fn test_error_display_git_clone() {
        let error = Error::GitClone {
            url: "https://github.com/test/repo.git".to_string(),
            r#ref: "master".to_string(),
            message: "Authentication failed".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Git clone error"));
        assert!(display.contains("repo.git@master"));
        assert!(display.contains("Authentication failed"));
    }

    #[test]
    fn test_error_display_link() {
        let error = Error::Link {
            link: PathBuf::from("/srv/win/repo/salt-winrepo"),
            target: PathBuf::from("/var/cache/winrepo/salt-winrepo"),
            message: "File exists".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Failed to link"));
        assert!(display.contains("/srv/win/repo/salt-winrepo"));
        assert!(display.contains("File exists"));
    }

    #[test]
    fn test_error_cache_write_keeps_source() {
        use std::error::Error as _;

        let error = Error::CacheWrite {
            path: PathBuf::from("/readonly/winrepo.p"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(format!("{}", error).contains("/readonly/winrepo.p"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_decode_error() {
        let decode_error =
            rmp_serde::from_slice::<std::collections::BTreeMap<String, String>>(&[0xc1])
                .unwrap_err();
        let error: Error = decode_error.into();
        assert!(format!("{}", error).contains("Deserialization error"));
    }
}
