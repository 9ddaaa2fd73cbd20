use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::process::Command;
use tracing::{debug, warn};

/// Only the most recent page is queried; older pull requests are not paginated.
pub const PR_PAGE_SIZE: u32 = 100;

const PULL_REQUESTS_QUERY: &str = r#"
query($owner: String!, $repo: String!, $limit: Int!) {
  repository(owner: $owner, name: $repo) {
    pullRequests(first: $limit, orderBy: {field: CREATED_AT, direction: DESC}) {
      nodes {
        number
        headRefName
        state
        author {
          login
        }
      }
    }
  }
}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub head_branch_name: String,
    pub number: u64,
    pub state: PrState,
    pub author_login: String,
}

/// Where pull request metadata comes from.
pub trait PullRequestSource {
    fn pull_requests(&self) -> Result<Vec<PullRequest>>;
}

/// Fetch pull requests, treating any failure as "no pull requests".
///
/// Branch listing must keep working offline or outside a GitHub repository,
/// so the error is only logged.
pub fn fetch_best_effort(source: &dyn PullRequestSource) -> Vec<PullRequest> {
    match source.pull_requests() {
        Ok(prs) => prs,
        Err(err) => {
            warn!("pull request lookup failed, continuing without it: {:#}", err);
            Vec::new()
        }
    }
}

/// [`PullRequestSource`] backed by `gh api graphql`, relying on gh's response cache.
#[derive(Debug, Clone)]
pub struct GhCli {
    cache_ttl: String,
}

impl GhCli {
    pub fn new(cache_ttl: impl Into<String>) -> Self {
        Self {
            cache_ttl: cache_ttl.into(),
        }
    }
}

impl PullRequestSource for GhCli {
    fn pull_requests(&self) -> Result<Vec<PullRequest>> {
        debug!(cache_ttl = %self.cache_ttl, "querying pull requests");
        // gh fills in {owner} and {repo} from the current repository.
        let output = Command::new("gh")
            .args(["api", "graphql", "--cache", &self.cache_ttl])
            .args(["-F", "owner={owner}", "-F", "repo={repo}"])
            .args(["-F", &format!("limit={}", PR_PAGE_SIZE)])
            .args(["-f", &format!("query={}", PULL_REQUESTS_QUERY)])
            .output()
            .context("Failed to execute gh api graphql")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Failed to list pull requests: {}", stderr.trim()));
        }

        parse_pull_requests(&output.stdout)
    }
}

#[derive(Deserialize)]
struct Response {
    data: ResponseData,
}

#[derive(Deserialize)]
struct ResponseData {
    repository: Repository,
}

#[derive(Deserialize)]
struct Repository {
    #[serde(rename = "pullRequests")]
    pull_requests: Connection,
}

#[derive(Deserialize)]
struct Connection {
    nodes: Vec<Node>,
}

#[derive(Deserialize)]
struct Node {
    number: u64,
    #[serde(rename = "headRefName")]
    head_ref_name: String,
    state: PrState,
    author: Option<Author>,
}

#[derive(Deserialize)]
struct Author {
    login: String,
}

/// Parse the GraphQL response body, keeping the API's ordering.
pub fn parse_pull_requests(body: &[u8]) -> Result<Vec<PullRequest>> {
    let response: Response =
        serde_json::from_slice(body).context("Failed to parse pull request response")?;

    Ok(response
        .data
        .repository
        .pull_requests
        .nodes
        .into_iter()
        .map(|node| PullRequest {
            head_branch_name: node.head_ref_name,
            number: node.number,
            state: node.state,
            // Deleted accounts come back as a null author.
            author_login: node
                .author
                .map(|a| a.login)
                .unwrap_or_else(|| "ghost".to_string()),
        })
        .collect())
}
