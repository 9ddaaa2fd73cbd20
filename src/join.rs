use crate::git::Branch;
use crate::github::PullRequest;

/// A branch paired with the pull request opened from it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRow {
    pub branch: Branch,
    pub pr: Option<PullRequest>,
}

/// Attach to each branch the first pull request whose head branch has the same name.
///
/// Pull requests are scanned in the order given, so when several share a head
/// branch the earliest one in the list wins. Unmatched pull requests are dropped.
pub fn join(branches: &[Branch], prs: &[PullRequest]) -> Vec<JoinedRow> {
    branches
        .iter()
        .map(|branch| JoinedRow {
            branch: branch.clone(),
            pr: prs
                .iter()
                .find(|pr| pr.head_branch_name == branch.name)
                .cloned(),
        })
        .collect()
}
