use anyhow::{anyhow, Context, Result};
use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::config::Config;

/// `sh` snippet that pulls the pull request number out of the highlighted
/// line (`$1`) into `$n`, leaving it empty when the row has no pull request.
const EXTRACT_PR_NUMBER: &str =
    r#"n=$(printf "%s\n" "$1" | grep -oE "(^|[[:space:]])#[0-9]+" | head -n 1 | tr -dc 0-9)"#;

/// What the picker's preview pane shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Preview {
    #[default]
    Plain,
    /// Pull request description.
    View,
    /// Pull request diff.
    Diff,
}

/// An interactive chooser over newline-delimited text.
pub trait Picker {
    /// Fail if the picker cannot run at all.
    fn ensure_available(&self) -> Result<()>;

    /// Present `input` and return the chosen line, or `None` if the user
    /// backed out or there was nothing to choose from.
    fn pick(&self, input: &str, preview: Preview) -> Result<Option<String>>;
}

/// [`Picker`] that runs fzf.
#[derive(Debug, Clone)]
pub struct Fzf {
    program: String,
    markdown_viewer: Option<String>,
    diff_viewer: Option<String>,
}

impl Fzf {
    /// Build from config, keeping the pretty-printers only if they are installed.
    pub fn from_config(config: &Config) -> Self {
        let installed = |cmd: &String| {
            cmd.split_whitespace()
                .next()
                .is_some_and(|program| is_on_path(program))
        };

        Self {
            program: config.picker.clone(),
            markdown_viewer: Some(config.markdown_viewer.clone()).filter(installed),
            diff_viewer: Some(config.diff_viewer.clone()).filter(installed),
        }
    }

    fn args(&self, preview: Preview) -> Vec<String> {
        let mut args: Vec<String> = ["--ansi", "--no-multi", "--height=40%", "--reverse"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        if let Some(cmd) = preview_command(
            preview,
            self.markdown_viewer.as_deref(),
            self.diff_viewer.as_deref(),
        ) {
            args.push(format!("--preview={}", cmd));
            args.push("--preview-window=right:60%:wrap".to_string());
            args.push("--bind=?:toggle-preview".to_string());
        }

        args
    }
}

impl Picker for Fzf {
    fn ensure_available(&self) -> Result<()> {
        if is_on_path(&self.program) {
            Ok(())
        } else {
            Err(anyhow!(
                "{} is required for interactive mode; install it or use --static",
                self.program
            ))
        }
    }

    fn pick(&self, input: &str, preview: Preview) -> Result<Option<String>> {
        if input.trim().is_empty() {
            return Ok(None);
        }

        let args = self.args(preview);
        debug!(program = %self.program, ?args, "launching picker");

        // fzf draws on /dev/tty, so only stdin and stdout are captured.
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to launch {}", self.program))?;

        let mut stdin = child.stdin.take().context("Picker stdin unavailable")?;
        match stdin.write_all(input.as_bytes()) {
            // The picker quit before reading everything; its exit status decides.
            Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                debug!("picker closed its input early");
            }
            result => result.context("Failed to send branches to picker")?,
        }
        drop(stdin);

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for {}", self.program))?;

        match output.status.code() {
            Some(0) => {
                let stdout = String::from_utf8(output.stdout)?;
                let line = stdout.lines().next().unwrap_or("").to_string();
                Ok((!line.trim().is_empty()).then_some(line))
            }
            // 1: no match, 130: interrupted with Esc or Ctrl-C
            Some(1) | Some(130) => Ok(None),
            _ => Err(anyhow!("{} exited with {}", self.program, output.status)),
        }
    }
}

/// Shell command for fzf's `--preview`, or `None` in plain mode.
///
/// fzf runs previews through the user's `$SHELL`, so the script is handed to
/// `sh` explicitly with the highlighted line as `$1`. A missing
/// pretty-printer leaves the raw `gh` output.
pub fn preview_command(
    preview: Preview,
    markdown_viewer: Option<&str>,
    diff_viewer: Option<&str>,
) -> Option<String> {
    let show = match preview {
        Preview::Plain => return None,
        Preview::View => match markdown_viewer {
            Some(viewer) => format!(r#"gh pr view "$n" | {}"#, viewer),
            None => r#"gh pr view "$n""#.to_string(),
        },
        Preview::Diff => match diff_viewer {
            Some(viewer) => format!(r#"gh pr diff "$n" --color=never | {}"#, viewer),
            None => r#"gh pr diff "$n" --color=always"#.to_string(),
        },
    };

    let script = format!(r#"{}; [ -n "$n" ] && {}"#, EXTRACT_PR_NUMBER, show);
    Some(format!("sh -c {} sh {{}}", single_quote(&script)))
}

/// Quote `s` as one word for both POSIX shells and fish.
fn single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Whether `program` resolves to a file, either directly or through `PATH`.
pub fn is_on_path(program: &str) -> bool {
    if program.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(program).is_file();
    }

    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}
