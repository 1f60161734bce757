//! # Genrepo Command
//!
//! Rebuilds the repository cache file from the definition tree. Problems with
//! individual documents are printed and do not change the exit status; only
//! a failure to create the root or write the cache does.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;

use winrepo::diagnostics::LogSink;
use winrepo::genrepo::{self, GenRepoReport};
use winrepo::output::Marker;

use super::Context;

/// Compile the definition tree into the cache file
#[derive(Args, Debug)]
pub struct GenrepoArgs {
    /// Cache file name, relative to the repository root.
    #[arg(long, value_name = "FILE")]
    pub cache_file: Option<PathBuf>,

    /// Extension of definition documents (default: sls).
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Print the full report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `genrepo` command.
pub fn execute(args: GenrepoArgs, ctx: Context) -> Result<()> {
    let Context { mut config, out } = ctx;
    if let Some(cache_file) = args.cache_file {
        config.cache_file = cache_file;
    }
    if let Some(extension) = args.extension {
        config.document_extension = extension;
    }

    let report = genrepo::run(&config, &LogSink).with_context(|| {
        format!(
            "Failed to build the repository cache for {}",
            config.repo_root.display()
        )
    })?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode report as JSON")?
        );
        return Ok(());
    }

    print_summary(&report, &out);
    Ok(())
}

fn print_summary(report: &GenRepoReport, out: &winrepo::output::OutputConfig) {
    for diagnostic in &report.scan.diagnostics {
        println!("{} {}", out.marker(Marker::Warning), diagnostic);
    }

    let index = &report.scan.index;
    println!(
        "{} Compiled {} package(s), {} version(s) from {} document(s)",
        out.marker(Marker::Ok),
        index.repo.len(),
        index.version_count(),
        report.scan.documents_scanned
    );
    println!(
        "{} Wrote {} ({} bytes)",
        out.marker(Marker::Info),
        out.emphasize(&report.written.path.display().to_string()),
        report.written.bytes
    );
    if !report.scan.diagnostics.is_empty() {
        println!(
            "{} {} problem(s) reported",
            out.marker(Marker::Warning),
            report.scan.diagnostics.len()
        );
    }
}
