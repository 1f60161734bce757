//! # Terminal Output
//!
//! Decides whether CLI output may use color and symbols, and provides the
//! markers the commands print in front of status lines.
//!
//! The decision honors, in order:
//! - `--color=always|never|auto`
//! - `NO_COLOR` (any value, https://no-color.org/)
//! - `CLICOLOR=0` and `CLICOLOR_FORCE=1`
//! - `TERM=dumb`
//! - whether stdout is a terminal
//!
//! ```rust,ignore
//! use winrepo::output::{Marker, OutputConfig};
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{} cache written", out.marker(Marker::Ok));
//! ```

use std::env;

use console::style;

/// Whether output is decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    pub use_color: bool,
}

/// Kinds of status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Ok,
    Failed,
    Warning,
    Info,
}

impl OutputConfig {
    /// Resolves the `--color` flag against the environment.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_ascii_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => color_from_env(),
        };
        Self { use_color }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// The prefix for a status line: a colored symbol, or a bracketed tag.
    pub fn marker(&self, marker: Marker) -> String {
        if !self.use_color {
            return match marker {
                Marker::Ok => "[OK]",
                Marker::Failed => "[FAIL]",
                Marker::Warning => "[WARN]",
                Marker::Info => "[INFO]",
            }
            .to_string();
        }

        let styled = match marker {
            Marker::Ok => style("✓").green(),
            Marker::Failed => style("✗").red(),
            Marker::Warning => style("!").yellow(),
            Marker::Info => style("•").cyan(),
        };
        styled.force_styling(true).bold().to_string()
    }

    /// Emphasizes a name or path when color is on.
    pub fn emphasize(&self, text: &str) -> String {
        if self.use_color {
            style(text).force_styling(true).bold().to_string()
        } else {
            text.to_string()
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

fn color_from_env() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| !v.is_empty() && v != "0") {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}
