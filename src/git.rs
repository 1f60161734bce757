//! Thin wrappers around the system `git` command.
//!
//! Using the `git` binary means authentication works the way it does for the
//! user on the command line: SSH keys, credential helpers and tokens from
//! `~/.gitconfig` all apply. Interactive prompts are disabled so a missing
//! credential fails the sync instead of hanging it.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use crate::error::{Error, Result};

fn git() -> Command {
    let mut cmd = Command::new("git");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

/// Runs `git -C <dir> <args>` and returns trimmed stdout.
fn run_in(dir: &Path, url: &str, args: &[&str]) -> Result<String> {
    debug!("git -C {} {}", dir.display(), args.join(" "));
    let output = git()
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            url: url.to_string(),
            stderr: e.to_string(),
        })?;
    check(output, url, args)
}

fn check(output: Output, url: &str, args: &[&str]) -> Result<String> {
    if !output.status.success() {
        return Err(Error::GitCommand {
            command: args.join(" "),
            url: url.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Clone `url` into `target_dir` without checking anything out.
pub fn clone(url: &str, target_dir: &Path) -> Result<()> {
    if let Some(parent) = target_dir.parent() {
        fs::create_dir_all(parent)?;
    }

    debug!("git clone --no-checkout -- {} {}", url, target_dir.display());
    let output = git()
        .args(["clone", "--no-checkout", "--", url])
        .arg(target_dir)
        .output()
        .map_err(|e| Error::GitClone {
            url: url.to_string(),
            r#ref: "HEAD".to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);

        // Provide helpful error message for common auth failures
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                For private repos, ensure you have:\n\
                - SSH key added to ssh-agent\n\
                - Git credentials configured\n\
                - Personal access token set up\n\
                Error: {}",
                stderr.trim()
            )
        } else {
            stderr.trim().to_string()
        };

        return Err(Error::GitClone {
            url: url.to_string(),
            r#ref: "HEAD".to_string(),
            message,
        });
    }

    Ok(())
}

/// Point `origin` at `url` and fetch everything, tags included.
pub fn fetch(repo_dir: &Path, url: &str) -> Result<()> {
    run_in(repo_dir, url, &["remote", "set-url", "origin", url])?;
    run_in(repo_dir, url, &["fetch", "--force", "--tags", "--prune", "origin"])?;
    Ok(())
}

/// Resolve a revision to a commit id.
///
/// Branch names are looked up on `origin` first so that a fetch moves them
/// forward; tags and commit ids resolve directly.
pub fn resolve_revision(repo_dir: &Path, url: &str, revision: &str) -> Result<String> {
    for candidate in [format!("origin/{}", revision), revision.to_string()] {
        let revspec = format!("{}^{{commit}}", candidate);
        if let Ok(commit) = run_in(repo_dir, url, &["rev-parse", "--verify", "--quiet", &revspec]) {
            return Ok(commit);
        }
    }

    Err(Error::GitCommand {
        command: format!("rev-parse {}", revision),
        url: url.to_string(),
        stderr: format!("revision '{}' not found", revision),
    })
}

/// Check out `commit` as a detached HEAD. With `force`, local changes and
/// untracked files are discarded.
pub fn checkout(repo_dir: &Path, url: &str, commit: &str, force: bool) -> Result<()> {
    if force {
        run_in(repo_dir, url, &["checkout", "--force", "--detach", commit])?;
        run_in(repo_dir, url, &["clean", "-ffd"])?;
    } else {
        run_in(repo_dir, url, &["checkout", "--detach", commit])?;
    }
    Ok(())
}

/// Bring `target_dir` to `revision` of `url`, cloning it first if needed.
///
/// A directory that exists but is not a git checkout is replaced when
/// `force` is set and is an error otherwise. A `url` or `revision` starting
/// with `-` is refused, since git would read it as an option.
pub fn sync_to_revision(url: &str, revision: &str, target_dir: &Path, force: bool) -> Result<String> {
    for (what, value) in [("url", url), ("revision", revision)] {
        if value.starts_with('-') {
            return Err(Error::GitClone {
                url: url.to_string(),
                r#ref: revision.to_string(),
                message: format!("{} '{}' must not start with '-'", what, value),
            });
        }
    }

    if target_dir.join(".git").exists() {
        fetch(target_dir, url)?;
    } else {
        if target_dir.exists() {
            if !force {
                return Err(Error::GitClone {
                    url: url.to_string(),
                    r#ref: revision.to_string(),
                    message: format!(
                        "{} exists and is not a git checkout",
                        target_dir.display()
                    ),
                });
            }
            fs::remove_dir_all(target_dir)?;
        }
        clone(url, target_dir)?;
    }

    let commit = resolve_revision(target_dir, url, revision)?;
    checkout(target_dir, url, &commit, force)?;
    Ok(commit)
}
