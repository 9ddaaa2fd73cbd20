use anyhow::{anyhow, Context, Result};
use std::process::Command;
use tracing::debug;

/// `%(HEAD)` goes first so the marker column is never trimmed away.
const BRANCH_FORMAT: &str =
    "%(HEAD)%09%(refname:short)%09%(committerdate:unix)%09%(committerdate:relative)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub last_commit_epoch: i64,
    pub last_commit_relative: String,
    pub is_current: bool,
}

/// The version-control operations the picker needs.
pub trait VersionControl {
    /// List local branches. Failure aborts the whole run.
    fn list_branches(&self) -> Result<Vec<Branch>>;

    /// Switch the working tree to `branch`.
    fn checkout(&self, branch: &str) -> Result<()>;
}

/// [`VersionControl`] backed by the `git` executable.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl VersionControl for GitCli {
    fn list_branches(&self) -> Result<Vec<Branch>> {
        debug!("listing local branches");
        let output = Command::new("git")
            .args([
                "for-each-ref",
                &format!("--format={BRANCH_FORMAT}"),
                "refs/heads",
            ])
            .output()
            .context("Failed to execute git for-each-ref")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git for-each-ref failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let stdout = String::from_utf8(output.stdout)?;
        parse_branches(&stdout)
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        debug!(branch, "checking out");
        // Inherit stdio so git's own progress and errors reach the user.
        let status = Command::new("git")
            .args(checkout_args(branch))
            .status()
            .context("Failed to execute git checkout")?;

        if !status.success() {
            return Err(anyhow!("git checkout {} failed", branch));
        }

        Ok(())
    }
}

/// Arguments for switching to `branch`. The trailing `--` keeps git from
/// reading the name as a path when a file or directory shares it.
pub fn checkout_args(branch: &str) -> [&str; 3] {
    ["checkout", branch, "--"]
}

/// Parse `git for-each-ref` output produced with [`BRANCH_FORMAT`].
pub fn parse_branches(output: &str) -> Result<Vec<Branch>> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_branch_line)
        .collect()
}

fn parse_branch_line(line: &str) -> Result<Branch> {
    let mut fields = line.splitn(4, '\t');
    let (Some(head), Some(name), Some(epoch), Some(relative)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(anyhow!("Malformed branch line: {:?}", line));
    };

    let last_commit_epoch = epoch
        .trim()
        .parse()
        .with_context(|| format!("Invalid commit timestamp for branch {}", name))?;

    Ok(Branch {
        name: name.to_string(),
        last_commit_epoch,
        last_commit_relative: relative.trim().to_string(),
        is_current: head.trim() == "*",
    })
}

/// The branch name in a picked table line is its first whitespace-delimited token.
pub fn branch_from_line(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}
