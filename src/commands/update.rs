//! # Update-Git-Repos Command
//!
//! Syncs every configured git repository into the checkout cache and links it
//! into the definition tree. Exits non-zero when any entry failed, after
//! reporting all of them.

use std::path::PathBuf;

use anyhow::{bail, Context as _, Result};
use clap::Args;

use winrepo::config::LinkPolicy;
use winrepo::diagnostics::LogSink;
use winrepo::output::Marker;
use winrepo::sync::{self, SyncReport};
use winrepo::vcs::GitSourceControl;

use super::Context;

/// Sync git repositories into the definition tree
#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Where repositories are checked out.
    ///
    /// Defaults to the system cache directory (`~/.cache/winrepo` on Linux).
    #[arg(long, value_name = "DIR", env = "WINREPO_GIT_CACHE")]
    pub git_cache_dir: Option<PathBuf>,

    /// Replace existing overlay links instead of failing the entry.
    #[arg(long)]
    pub replace_links: bool,

    /// Fetch repositories concurrently.
    #[arg(long)]
    pub parallel: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `update-git-repos` command.
pub fn execute(args: UpdateArgs, ctx: Context) -> Result<()> {
    let Context { mut config, out } = ctx;
    if let Some(dir) = args.git_cache_dir {
        config.git_cache_dir = dir;
    }
    if args.replace_links {
        config.link_policy = LinkPolicy::Replace;
    }
    config.parallel |= args.parallel;

    let report = sync::update_git_repos(&config, &GitSourceControl, &LogSink);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode report as JSON")?
        );
    } else {
        print_outcomes(&report, &out);
    }

    if !report.all_ok() {
        bail!(
            "{} of {} repositories failed to update",
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}

fn print_outcomes(report: &SyncReport, out: &winrepo::output::OutputConfig) {
    for diagnostic in &report.diagnostics {
        println!("{} {}", out.marker(Marker::Warning), diagnostic);
    }

    if report.outcomes.is_empty() {
        println!("{} No git repositories configured", out.marker(Marker::Info));
        return;
    }

    for (locator, outcome) in &report.outcomes {
        match &outcome.error {
            None => println!(
                "{} {} @ {} -> {}",
                out.marker(Marker::Ok),
                out.emphasize(locator),
                outcome.revision,
                outcome.target.display()
            ),
            Some(error) => println!(
                "{} {}: {}",
                out.marker(Marker::Failed),
                out.emphasize(locator),
                error
            ),
        }
    }
}
