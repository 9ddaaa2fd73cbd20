// Library interface for gh-branch
// The binary is a thin wrapper; integration tests drive the pipeline through here.

pub mod app;
pub mod cli;
pub mod config;
pub mod git;
pub mod github;
pub mod join;
pub mod picker;
pub mod table;

pub use app::{App, Outcome};
pub use git::Branch;
pub use github::{PrState, PullRequest};
pub use join::JoinedRow;
