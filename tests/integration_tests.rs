use anyhow::{anyhow, Result};
use gh_branch::cli::Args;
use gh_branch::config::Config;
use gh_branch::git::VersionControl;
use gh_branch::github::PullRequestSource;
use gh_branch::picker::{Picker, Preview};
use gh_branch::{App, Branch, Outcome, PrState, PullRequest};
use std::cell::{Cell, RefCell};

// In-memory collaborators recording how they were used.

struct FakeGit {
    branches: Result<Vec<Branch>, String>,
    list_calls: Cell<usize>,
    checkouts: RefCell<Vec<String>>,
    fail_checkout: bool,
}

impl FakeGit {
    fn new(branches: Vec<Branch>) -> Self {
        Self {
            branches: Ok(branches),
            list_calls: Cell::new(0),
            checkouts: RefCell::new(Vec::new()),
            fail_checkout: false,
        }
    }
}

impl VersionControl for FakeGit {
    fn list_branches(&self) -> Result<Vec<Branch>> {
        self.list_calls.set(self.list_calls.get() + 1);
        self.branches.clone().map_err(|e| anyhow!(e))
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.checkouts.borrow_mut().push(branch.to_string());
        if self.fail_checkout {
            return Err(anyhow!("error: pathspec '{}' did not match", branch));
        }
        Ok(())
    }
}

struct FakeGh {
    prs: Option<Vec<PullRequest>>,
    calls: Cell<usize>,
}

impl FakeGh {
    fn with(prs: Vec<PullRequest>) -> Self {
        Self {
            prs: Some(prs),
            calls: Cell::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            prs: None,
            calls: Cell::new(0),
        }
    }
}

impl PullRequestSource for FakeGh {
    fn pull_requests(&self) -> Result<Vec<PullRequest>> {
        self.calls.set(self.calls.get() + 1);
        self.prs
            .clone()
            .ok_or_else(|| anyhow!("gh: could not resolve host api.github.com"))
    }
}

/// Picks the first line containing `wanted`, or nothing.
struct FakePicker {
    wanted: Option<&'static str>,
    seen: RefCell<Option<(String, Preview)>>,
}

impl FakePicker {
    fn choosing(wanted: &'static str) -> Self {
        Self {
            wanted: Some(wanted),
            seen: RefCell::new(None),
        }
    }

    fn cancelling() -> Self {
        Self {
            wanted: None,
            seen: RefCell::new(None),
        }
    }
}

impl Picker for FakePicker {
    fn ensure_available(&self) -> Result<()> {
        Ok(())
    }

    fn pick(&self, input: &str, preview: Preview) -> Result<Option<String>> {
        *self.seen.borrow_mut() = Some((input.to_string(), preview));
        let Some(wanted) = self.wanted else {
            return Ok(None);
        };
        Ok(input
            .lines()
            .find(|line| line.contains(wanted))
            .map(str::to_string))
    }
}

fn branch(name: &str, epoch: i64, relative: &str, current: bool) -> Branch {
    Branch {
        name: name.to_string(),
        last_commit_epoch: epoch,
        last_commit_relative: relative.to_string(),
        is_current: current,
    }
}

fn sample_branches() -> Vec<Branch> {
    vec![
        branch("main", 100, "3 days ago", true),
        branch("feat-a", 200, "2 days ago", false),
        branch("feat-b", 50, "4 days ago", false),
    ]
}

fn alice_pr() -> PullRequest {
    PullRequest {
        head_branch_name: "feat-a".to_string(),
        number: 5,
        state: PrState::Open,
        author_login: "alice".to_string(),
    }
}

fn static_args() -> Args {
    Args {
        static_table: true,
        ..Default::default()
    }
}

#[test]
fn test_static_render() {
    let git = FakeGit::new(sample_branches());
    let gh = FakeGh::with(vec![alice_pr()]);
    let picker = FakePicker::cancelling();
    let app = App {
        vcs: &git,
        prs: &gh,
        picker: &picker,
    };

    let mut out = Vec::new();
    let outcome = app.run(&static_args(), false, &mut out).unwrap();
    assert_eq!(outcome, Outcome::Done);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "feat-a  2 days ago  #5  by alice\nfeat-b  4 days ago\n"
    );
    assert!(picker.seen.borrow().is_none());
    assert!(git.checkouts.borrow().is_empty());
}

#[test]
fn test_pr_failure_still_renders() {
    let git = FakeGit::new(sample_branches());
    let gh = FakeGh::failing();
    let picker = FakePicker::cancelling();
    let app = App {
        vcs: &git,
        prs: &gh,
        picker: &picker,
    };

    let mut out = Vec::new();
    app.run(&static_args(), false, &mut out).unwrap();
    assert_eq!(gh.calls.get(), 1);
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "feat-a  2 days ago\nfeat-b  4 days ago\n"
    );
}

#[test]
fn test_branch_list_failure_is_fatal() {
    let git = FakeGit {
        branches: Err("fatal: not a git repository".to_string()),
        ..FakeGit::new(Vec::new())
    };
    let gh = FakeGh::with(Vec::new());
    let picker = FakePicker::choosing("feat");
    let app = App {
        vcs: &git,
        prs: &gh,
        picker: &picker,
    };

    let err = app.run(&Args::default(), true, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("not a git repository"));
    assert!(picker.seen.borrow().is_none());
}

#[test]
fn test_diff_and_view_do_no_work() {
    let git = FakeGit::new(sample_branches());
    let gh = FakeGh::with(vec![alice_pr()]);
    let picker = FakePicker::choosing("feat-a");
    let app = App {
        vcs: &git,
        prs: &gh,
        picker: &picker,
    };

    let args = Args {
        diff: true,
        view: true,
        ..Default::default()
    };
    assert!(app.run(&args, false, &mut Vec::new()).is_err());
    assert_eq!(git.list_calls.get(), 0);
    assert_eq!(gh.calls.get(), 0);
    assert!(git.checkouts.borrow().is_empty());
}

#[test]
fn test_pick_checks_out_first_token() {
    let git = FakeGit::new(sample_branches());
    let gh = FakeGh::with(vec![alice_pr()]);
    let picker = FakePicker::choosing("alice");
    let app = App {
        vcs: &git,
        prs: &gh,
        picker: &picker,
    };

    let args = Args {
        view: true,
        ..Default::default()
    };
    let outcome = app.run(&args, false, &mut Vec::new()).unwrap();
    assert_eq!(outcome, Outcome::Done);
    assert_eq!(*git.checkouts.borrow(), vec!["feat-a".to_string()]);

    let seen = picker.seen.borrow();
    let (input, preview) = seen.as_ref().unwrap();
    assert_eq!(*preview, Preview::View);
    assert!(!input.contains("main"));
    // The picker always receives the colored table.
    assert!(input.contains('\x1b'));
}

#[test]
fn test_cancelled_pick_skips_checkout() {
    let git = FakeGit::new(sample_branches());
    let gh = FakeGh::with(Vec::new());
    let picker = FakePicker::cancelling();
    let app = App {
        vcs: &git,
        prs: &gh,
        picker: &picker,
    };

    let outcome = app.run(&Args::default(), false, &mut Vec::new()).unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert!(git.checkouts.borrow().is_empty());
}

#[test]
fn test_only_current_branch() {
    let git = FakeGit::new(vec![branch("main", 1, "1 hour ago", true)]);
    let gh = FakeGh::with(Vec::new());
    let picker = FakePicker::choosing("main");
    let app = App {
        vcs: &git,
        prs: &gh,
        picker: &picker,
    };

    let mut out = Vec::new();
    assert_eq!(
        app.run(&static_args(), false, &mut out).unwrap(),
        Outcome::Done
    );
    assert!(out.is_empty());

    let outcome = app.run(&Args::default(), false, &mut Vec::new()).unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert!(git.checkouts.borrow().is_empty());
}

#[test]
fn test_checkout_failure_propagates() {
    let git = FakeGit {
        fail_checkout: true,
        ..FakeGit::new(sample_branches())
    };
    let gh = FakeGh::with(Vec::new());
    let picker = FakePicker::choosing("feat-b");
    let app = App {
        vcs: &git,
        prs: &gh,
        picker: &picker,
    };

    let err = app.run(&Args::default(), false, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("feat-b"));
    assert_eq!(*git.checkouts.borrow(), vec!["feat-b".to_string()]);
}

#[test]
fn test_config_save_and_load() {
    let path = std::env::temp_dir()
        .join("gh_branch_integration_test")
        .join("config.toml");
    let _ = std::fs::remove_file(&path);

    let custom = Config {
        picker: "sk".to_string(),
        cache_ttl: "30s".to_string(),
        markdown_viewer: String::new(),
        diff_viewer: "bat -l diff".to_string(),
    };
    custom.save_to_path(&path).unwrap();
    assert!(path.exists());

    // A disabled viewer must stay disabled rather than fall back to the default.
    let loaded = Config::load_from_path(&path).unwrap();
    assert_eq!(loaded, custom);
    assert!(loaded.markdown_viewer.is_empty());

    let _ = std::fs::remove_file(&path);
}
