//! # winrepo CLI
//!
//! Binary entry point for the `winrepo` command-line tool. It parses the
//! command line with `clap`, loads the configuration and hands off to one of
//! the command modules. All of the real work lives in the library crate.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
