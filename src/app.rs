//! The branch picker pipeline: gather, join, render, select, check out.

use anyhow::{anyhow, Result};
use std::io::Write;
use tracing::{debug, info};

use crate::cli::{Args, Mode};
use crate::git::{self, VersionControl};
use crate::github::{self, PullRequestSource};
use crate::join;
use crate::picker::Picker;
use crate::table;

/// How a run ended when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Table printed, or a branch checked out.
    Done,
    /// The picker returned no selection.
    Cancelled,
}

/// The external collaborators a run needs.
pub struct App<'a> {
    pub vcs: &'a dyn VersionControl,
    pub prs: &'a dyn PullRequestSource,
    pub picker: &'a dyn Picker,
}

impl App<'_> {
    /// Run one pass of the pipeline. Static output goes to `out`.
    ///
    /// Flag conflicts and a missing picker are reported before anything is
    /// fetched. `color` applies to static output only; the picker always gets color.
    pub fn run(&self, args: &Args, color: bool, out: &mut dyn Write) -> Result<Outcome> {
        let mode = args.mode()?;
        if let Mode::Interactive(_) = mode {
            self.picker.ensure_available()?;
        }

        let branches = self.vcs.list_branches()?;
        let prs = github::fetch_best_effort(self.prs);
        debug!(branches = branches.len(), prs = prs.len(), "gathered");
        let rows = join::join(&branches, &prs);

        match mode {
            Mode::Static => {
                out.write_all(table::render_table(&rows, color).as_bytes())?;
                out.flush()?;
                Ok(Outcome::Done)
            }
            Mode::Interactive(preview) => {
                let input = table::render_table(&rows, true);
                let Some(line) = self.picker.pick(&input, preview)? else {
                    return Ok(Outcome::Cancelled);
                };

                let branch = git::branch_from_line(&line)
                    .ok_or_else(|| anyhow!("Selected line has no branch name"))?;
                info!(branch, "switching branch");
                self.vcs.checkout(branch)?;
                Ok(Outcome::Done)
            }
        }
    }
}
