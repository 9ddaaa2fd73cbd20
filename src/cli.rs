use anyhow::{anyhow, bail, Result};
use clap::{error::ErrorKind, ArgAction, Parser};
use std::{io, process};
use tracing::Level;

use crate::picker::Preview;

#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "gh-branch")]
#[command(
    about = "Pick a local branch, annotated with its pull request, and check it out",
    long_about = None
)]
pub struct Args {
    /// Print the branch table and exit instead of opening the picker
    #[arg(long = "static")]
    pub static_table: bool,

    /// Preview the pull request diff for the highlighted branch
    #[arg(short, long, conflicts_with = "view")]
    pub diff: bool,

    /// Preview the pull request description for the highlighted branch
    #[arg(short, long)]
    pub view: bool,

    /// Raise log verbosity (repeatable)
    #[arg(long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// What the invocation should do once the branch table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Static,
    Interactive(Preview),
}

impl Args {
    /// Resolve the flags into a [`Mode`].
    ///
    /// `--diff` and `--view` are rejected together here as well as by clap, so
    /// an `Args` built in code cannot slip past the check.
    pub fn mode(&self) -> Result<Mode> {
        if self.diff && self.view {
            bail!("--diff and --view cannot be used together");
        }

        if self.static_table {
            return Ok(Mode::Static);
        }

        let preview = if self.diff {
            Preview::Diff
        } else if self.view {
            Preview::View
        } else {
            Preview::Plain
        };
        Ok(Mode::Interactive(preview))
    }

    /// Install the global tracing subscriber at the level chosen by `--verbose`.
    pub fn init_tracing(&self) -> Result<()> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(match self.verbose {
                0 => Level::ERROR,
                1 => Level::WARN,
                2 => Level::INFO,
                3 => Level::DEBUG,
                _ => Level::TRACE,
            })
            .with_writer(io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow!(e))
    }
}

/// Exit status for a clap parse failure: help is a success, everything else is 1.
pub fn exit_code_for(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

/// Parse the process arguments, printing usage and exiting on failure or `--help`.
pub fn parse_or_exit() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // clap routes help to stdout and errors to stderr
            let _ = err.print();
            process::exit(exit_code_for(err.kind()));
        }
    }
}
