//! # CLI Command Implementations
//!
//! One module per subcommand. Each defines an `Args` struct derived with
//! `clap` and an `execute` function that applies the command-specific
//! overrides to the shared [`Context`] and calls into the `winrepo` library.

pub mod genrepo;
pub mod show;
pub mod update;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use winrepo::config::{self, WinRepoConfig};
use winrepo::output::OutputConfig;

/// What every command starts from: the resolved configuration and how to
/// print.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: WinRepoConfig,
    pub out: OutputConfig,
}

impl Context {
    /// Loads the configuration file and applies global overrides.
    pub fn load(config_path: Option<&Path>, repo_root: Option<PathBuf>, color: &str) -> Result<Self> {
        let mut config = config::load(config_path).with_context(|| match config_path {
            Some(path) => format!("Failed to load config from {}", path.display()),
            None => "Failed to load configuration".to_string(),
        })?;

        if let Some(root) = repo_root {
            config.repo_root = root;
        }

        Ok(Self {
            config,
            out: OutputConfig::from_env_and_flag(color),
        })
    }
}
