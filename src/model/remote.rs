//! The simulated remote: one record per session, stored apart from the repository.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Host used for simulated repository URLs.
const REMOTE_HOST: &str = "https://github-sim.local";

/// Host used for simulated published sites.
const PAGES_HOST: &str = "https://pages-sim.local";

/// A pseudo-hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRepository {
    pub name: String,
    pub url: String,
    pub default_branch: String,
    pub last_pushed_branch: Option<String>,

    /// Snapshot of the last pushed branch's full history, newest first.
    pub commits: Vec<RemoteCommit>,

    pub pull_requests: Vec<PullRequest>,
    pub next_pr_id: u64,

    pub pages_url: Option<String>,
    pub pages_published_at: Option<Timestamp>,
    pub pages_last_update: Option<Timestamp>,
}

impl RemoteRepository {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("{REMOTE_HOST}/{name}.git"),
            default_branch: "main".to_string(),
            last_pushed_branch: None,
            commits: Vec::new(),
            pull_requests: Vec::new(),
            next_pr_id: 1,
            pages_url: None,
            pages_published_at: None,
            pages_last_update: None,
        }
    }

    /// Where `pages publish` puts this repository's site.
    pub fn site_url(&self) -> String {
        format!("{PAGES_HOST}/{}", self.name)
    }

    /// True when `url` names this repository, by full URL or by bare name.
    pub fn matches_url(&self, url: &str) -> bool {
        let url = url.trim_end_matches('/');
        url == self.name || url.trim_end_matches(".git") == self.url.trim_end_matches(".git")
    }
}

/// A commit as recorded by a push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCommit {
    pub oid: String,
    pub message: String,
    pub author: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub id: u64,
    pub from_branch: String,
    pub to_branch: String,
    pub title: String,
    pub status: PrStatus,
    pub created_at: Timestamp,
    pub merged_at: Option<Timestamp>,
}

/// A pull request moves from open to merged once and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrStatus {
    Open,
    Merged,
}

impl fmt::Display for PrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Open => "OPEN",
            Self::Merged => "MERGED",
        })
    }
}
