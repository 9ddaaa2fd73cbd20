use anyhow::Result;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use gh_branch::app::{App, Outcome};
use gh_branch::cli;
use gh_branch::config::Config;
use gh_branch::git::GitCli;
use gh_branch::github::GhCli;
use gh_branch::picker::Fzf;

fn main() -> ExitCode {
    let args = cli::parse_or_exit();

    match run(&args) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Cancelled) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &cli::Args) -> Result<Outcome> {
    args.init_tracing()?;
    let config = Config::load()?;

    let picker = Fzf::from_config(&config);
    let app = App {
        vcs: &GitCli,
        prs: &GhCli::new(config.cache_ttl.clone()),
        picker: &picker,
    };

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    app.run(args, color, &mut stdout.lock())
}
