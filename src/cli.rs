//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{self, Context};

/// winrepo - Build and maintain the Windows package repository index
#[derive(Parser, Debug)]
#[command(name = "winrepo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Configuration file. Defaults to ./winrepo.yaml when present.
    #[arg(long, global = true, value_name = "FILE", env = "WINREPO_CONFIG")]
    config: Option<PathBuf>,

    /// Root of the package definition tree (overrides the config file)
    #[arg(long, global = true, value_name = "DIR", env = "WINREPO_ROOT")]
    repo_root: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile the definition tree into the repository cache file
    Genrepo(commands::genrepo::GenrepoArgs),

    /// Sync the configured git repositories and link them into the definition tree
    UpdateGitRepos(commands::update::UpdateArgs),

    /// Show the contents of the repository cache file
    Show(commands::show::ShowArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let ctx = Context::load(self.config.as_deref(), self.repo_root, &self.color)?;

        match self.command {
            Commands::Genrepo(args) => commands::genrepo::execute(args, ctx),
            Commands::UpdateGitRepos(args) => commands::update::execute(args, ctx),
            Commands::Show(args) => commands::show::execute(args, ctx),
        }
    }
}

fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}
