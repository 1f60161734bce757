//! # Show Command
//!
//! Reads the cache file back and prints what it holds: every package with its
//! version count, or the versions of one package.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context as _, Result};
use clap::Args;
use serde::Serialize;

use winrepo::genrepo::normalize::full_name;
use winrepo::genrepo::{write, RepositoryIndex};
use winrepo::output::{Marker, OutputConfig};

use super::Context;

/// Show the contents of the cache file
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Show the versions of this package only.
    pub package: Option<String>,

    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PackageSummary<'a> {
    name: &'a str,
    versions: Vec<VersionSummary<'a>>,
}

#[derive(Serialize)]
struct VersionSummary<'a> {
    version: &'a str,
    full_name: Option<String>,
}

/// Execute the `show` command.
pub fn execute(args: ShowArgs, ctx: Context) -> Result<()> {
    let path = ctx.config.cache_path();
    if !path.exists() {
        return Err(anyhow!(
            "Cache file {} not found\n  hint: run `winrepo genrepo` first",
            path.display()
        ));
    }

    let index = write::read(&path)?;

    match args.package {
        Some(package) => show_package(&index, &package, args.json, &ctx.out),
        None => show_all(&index, args.json, &ctx.out),
    }
}

fn summarize<'a>(name: &'a str, index: &'a RepositoryIndex) -> Option<PackageSummary<'a>> {
    let versions = index.package(name)?;
    Some(PackageSummary {
        name,
        versions: versions
            .iter()
            .map(|(version, record)| VersionSummary {
                version,
                full_name: full_name(record),
            })
            .collect(),
    })
}

fn show_package(index: &RepositoryIndex, package: &str, json: bool, out: &OutputConfig) -> Result<()> {
    let summary = summarize(package, index)
        .ok_or_else(|| anyhow!("Package '{}' is not in the repository cache", package))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to encode package as JSON")?
        );
        return Ok(());
    }

    println!("{}", out.emphasize(summary.name));
    for version in &summary.versions {
        match &version.full_name {
            Some(full_name) => println!("  {}  {}", version.version, full_name),
            None => println!("  {}", version.version),
        }
    }
    Ok(())
}

fn show_all(index: &RepositoryIndex, json: bool, out: &OutputConfig) -> Result<()> {
    if json {
        let counts: BTreeMap<&str, usize> = index
            .repo
            .iter()
            .map(|(name, versions)| (name.as_str(), versions.len()))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "packages": counts,
                "name_map": index.name_map,
            }))
            .context("Failed to encode cache as JSON")?
        );
        return Ok(());
    }

    if index.is_empty() {
        println!("{} The repository cache is empty", out.marker(Marker::Info));
        return Ok(());
    }

    for (name, versions) in &index.repo {
        println!("{}  ({} version(s))", out.emphasize(name), versions.len());
    }
    println!();
    println!(
        "{} package(s), {} version(s), {} full name(s)",
        index.repo.len(),
        index.version_count(),
        index.name_map.len()
    );
    Ok(())
}
