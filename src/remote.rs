//! The simulated hosting service behind `github ...`, `git push` and `git pages`.
//!
//! [`RemoteSim`] owns the session's single [`RemoteRepository`] record. It
//! never touches the repository's object store: a push copies the branch's
//! history into the record, replacing whatever was there.

use jiff::Timestamp;
use tracing::{debug, info};

use crate::error::{CommandError, Result};
use crate::graph::{CommitGraph, GraphError, short_id};
use crate::model::{PrStatus, PullRequest, RemoteCommit, RemoteRepository};
use crate::vfs::Vfs;

/// The only remote name `git push` accepts.
pub const ORIGIN: &str = "origin";

#[derive(Debug, Clone, Default)]
pub struct RemoteSim {
    record: Option<RemoteRepository>,
}

impl RemoteSim {
    pub fn new(record: Option<RemoteRepository>) -> Self {
        Self { record }
    }

    /// The current record, `None` until `github create` runs.
    pub fn record(&self) -> Option<&RemoteRepository> {
        self.record.as_ref()
    }

    fn record_mut(&mut self) -> Result<&mut RemoteRepository> {
        self.record.as_mut().ok_or(CommandError::RemoteNotFound)
    }

    /// Creates the remote, replacing any previous one.
    pub fn create(&mut self, name: &str) -> &RemoteRepository {
        info!(name, "simulated remote created");
        self.record.insert(RemoteRepository::new(name))
    }

    /// Replaces the remote's commits with the full history of `branch`.
    pub fn push(
        &mut self,
        graph: &dyn CommitGraph,
        fs: &Vfs,
        remote_name: &str,
        branch: &str,
    ) -> Result<String> {
        if remote_name != ORIGIN {
            return Err(CommandError::Remote(format!(
                "Only '{ORIGIN}' is supported for now: git push {ORIGIN} <branch>"
            )));
        }
        let record = self.record_mut()?;
        let log = match graph.log(fs, branch) {
            Ok(log) => log,
            Err(GraphError::RefNotFound(_)) => {
                return Err(CommandError::Remote(format!(
                    "Could not read branch '{branch}'. Have you made any commits on it?"
                )));
            }
            Err(e) => return Err(e.into()),
        };

        record.commits = log
            .into_iter()
            .map(|c| RemoteCommit {
                oid: c.id,
                message: c.message,
                author: c.author.name,
                timestamp: c.timestamp,
            })
            .collect();
        record.last_pushed_branch = Some(branch.to_string());
        debug!(branch, commits = record.commits.len(), "pushed");

        Ok([
            format!("Pushed to {} (simulated)", record.url),
            format!("Branch: {branch}"),
            format!("Commits sent: {}", record.commits.len()),
        ]
        .join("\n"))
    }

    pub fn create_pull_request(
        &mut self,
        from: &str,
        to: &str,
        title: Option<&str>,
    ) -> Result<PullRequest> {
        let record = self.record_mut()?;
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => format!("PR: {from} → {to}"),
        };
        let pr = PullRequest {
            id: record.next_pr_id,
            from_branch: from.to_string(),
            to_branch: to.to_string(),
            title,
            status: PrStatus::Open,
            created_at: Timestamp::now(),
            merged_at: None,
        };
        record.next_pr_id += 1;
        record.pull_requests.push(pr.clone());
        debug!(id = pr.id, from, to, "pull request opened");
        Ok(pr)
    }

    pub fn pull_requests(&self) -> &[PullRequest] {
        self.record
            .as_ref()
            .map(|r| r.pull_requests.as_slice())
            .unwrap_or_default()
    }

    /// Marks a pull request merged. Merging it again returns it unchanged.
    pub fn merge_pull_request(&mut self, id: u64) -> Result<PullRequest> {
        let record = self.record_mut()?;
        let pr = record
            .pull_requests
            .iter_mut()
            .find(|pr| pr.id == id)
            .ok_or_else(|| CommandError::Remote(format!("No pull request with id {id}.")))?;
        if pr.status == PrStatus::Open {
            pr.status = PrStatus::Merged;
            pr.merged_at = Some(Timestamp::now());
            debug!(id, "pull request merged");
        }
        Ok(pr.clone())
    }

    pub fn pages_publish(&mut self) -> Result<String> {
        let record = self.record_mut()?;
        let url = record.site_url();
        record.pages_url = Some(url.clone());
        record.pages_published_at = Some(Timestamp::now());
        record.pages_last_update = None;
        Ok([
            "Site published on Pages (simulated)".to_string(),
            format!("URL: {url}"),
            String::new(),
            "Update it later with: git pages republish".to_string(),
        ]
        .join("\n"))
    }

    pub fn pages_republish(&mut self) -> Result<String> {
        let record = self.record_mut()?;
        let Some(url) = record.pages_url.clone() else {
            return Err(CommandError::Remote(
                "The site has not been published yet.\nRun first: git pages publish".to_string(),
            ));
        };
        record.pages_last_update = Some(Timestamp::now());
        Ok([
            "Site updated on Pages (simulated)".to_string(),
            format!("URL: {url}"),
            String::new(),
            "Your latest commits are live.".to_string(),
        ]
        .join("\n"))
    }

    /// What `github status` prints.
    pub fn status(&self) -> String {
        let Some(remote) = &self.record else {
            return "No simulated remote yet.\nCreate one with: github create <repo-name>".into();
        };
        let mut out = vec![
            "Simulated GitHub:".to_string(),
            format!("  Repository:     {}", remote.name),
            format!("  URL:            {}", remote.url),
            format!("  Default branch: {}", remote.default_branch),
        ];
        if remote.commits.is_empty() {
            out.push("  (nothing pushed yet)".to_string());
        } else {
            if let Some(branch) = &remote.last_pushed_branch {
                out.push(format!("  Last pushed branch: {branch}"));
            }
            out.push("  Remote commits:".to_string());
            out.extend(
                remote
                    .commits
                    .iter()
                    .map(|c| format!("    {}  {}", short_id(&c.oid), c.message)),
            );
        }
        if !remote.pull_requests.is_empty() {
            out.push(format!(
                "  Pull requests: {} (see \"github pr list\")",
                remote.pull_requests.len()
            ));
        }
        if let Some(url) = &remote.pages_url {
            out.push(format!("  Pages: {url}"));
        }
        out.join("\n")
    }
}

// ── Rendering ──

pub fn created_message(remote: &RemoteRepository) -> String {
    [
        format!("Simulated remote repo created: {}", remote.name),
        format!("Simulated URL: {}", remote.url),
        String::new(),
        "Connect it and push with:".to_string(),
        format!("  git remote add {ORIGIN} {}", remote.url),
        format!("  git push {ORIGIN} main"),
    ]
    .join("\n")
}

pub fn pr_created_message(pr: &PullRequest) -> String {
    [
        format!("Simulated pull request created (#{}):", pr.id),
        format!("  From:  {}", pr.from_branch),
        format!("  To:    {}", pr.to_branch),
        format!("  Title: {}", pr.title),
        String::new(),
        "On a real host, someone would review the code before merging.".to_string(),
    ]
    .join("\n")
}

pub fn pr_list_message(prs: &[PullRequest]) -> String {
    if prs.is_empty() {
        return "No pull requests yet. Open one with: github pr create <from> [to]".to_string();
    }
    let mut out = vec!["Pull requests:".to_string()];
    out.extend(prs.iter().map(|pr| {
        format!(
            "#{} [{}] {} → {}: {}",
            pr.id, pr.status, pr.from_branch, pr.to_branch, pr.title
        )
    }));
    out.join("\n")
}

pub fn pr_merged_message(pr: &PullRequest) -> String {
    [
        format!("PR #{} marked as MERGED.", pr.id),
        format!("Source branch: {}", pr.from_branch),
        format!("Target branch: {}", pr.to_branch),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::graph::{Author, DEFAULT_BRANCH, REPO_DIR, VfsGraph};

    fn repo() -> (Vfs, VfsGraph) {
        let mut fs = Vfs::new();
        let graph = VfsGraph::new(REPO_DIR);
        graph.init(&mut fs, DEFAULT_BRANCH).unwrap();
        (fs, graph)
    }

    fn commit(fs: &mut Vfs, graph: &VfsGraph, msg: &str) {
        fs.write_file("/repo/notes.txt", msg).unwrap();
        graph.add_to_index(fs, "notes.txt").unwrap();
        let author = Author {
            name: "Learner".into(),
            email: "learner@example.com".into(),
        };
        graph.commit(fs, msg, &author).unwrap();
    }

    #[test]
    fn everything_needs_a_remote_first() {
        let (fs, graph) = repo();
        let mut sim = RemoteSim::default();

        assert_eq!(
            sim.push(&graph, &fs, ORIGIN, "main").unwrap_err(),
            CommandError::RemoteNotFound
        );
        assert_eq!(
            sim.create_pull_request("a", "main", None).unwrap_err(),
            CommandError::RemoteNotFound
        );
        assert_eq!(sim.pages_publish().unwrap_err(), CommandError::RemoteNotFound);
        assert!(sim.pull_requests().is_empty());
        assert!(sim.status().starts_with("No simulated remote yet."));
    }

    #[test]
    fn create_replaces_previous_remote() {
        let mut sim = RemoteSim::default();
        sim.create("one");
        sim.create_pull_request("a", "main", None).unwrap();

        let remote = sim.create("two");

        assert_eq!(remote.url, "https://github-sim.local/two.git");
        assert!(remote.pull_requests.is_empty());
        assert_eq!(remote.next_pr_id, 1);
    }

    #[test]
    fn push_only_accepts_origin() {
        let (mut fs, graph) = repo();
        commit(&mut fs, &graph, "first commit");
        let mut sim = RemoteSim::default();
        sim.create("site");

        let err = sim.push(&graph, &fs, "upstream", "main").unwrap_err();
        assert!(matches!(err, CommandError::Remote(_)));
    }

    #[test]
    fn second_push_replaces_snapshot_with_full_history() {
        let (mut fs, graph) = repo();
        let mut sim = RemoteSim::default();
        sim.create("site");

        commit(&mut fs, &graph, "first commit");
        sim.push(&graph, &fs, ORIGIN, "main").unwrap();
        assert_eq!(sim.record().unwrap().commits.len(), 1);

        commit(&mut fs, &graph, "second commit");
        let out = sim.push(&graph, &fs, ORIGIN, "main").unwrap();

        let remote = sim.record().unwrap();
        assert_eq!(remote.commits.len(), graph.log(&fs, "main").unwrap().len());
        assert_eq!(remote.commits.len(), 2);
        assert_eq!(remote.commits[0].message, "second commit");
        assert_eq!(remote.last_pushed_branch.as_deref(), Some("main"));
        assert!(out.ends_with("Commits sent: 2"));
    }

    #[test]
    fn push_of_branch_without_commits_is_refused() {
        let (fs, graph) = repo();
        let mut sim = RemoteSim::default();
        sim.create("site");

        let err = sim.push(&graph, &fs, ORIGIN, "main").unwrap_err();
        assert!(err.to_string().contains("Have you made any commits"));
    }

    #[test]
    fn pull_request_ids_increment_and_titles_default() {
        let mut sim = RemoteSim::default();
        sim.create("site");

        let first = sim.create_pull_request("feature/login", "main", None).unwrap();
        let second = sim
            .create_pull_request("fix", "main", Some("  Fix typo  "))
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(first.title, "PR: feature/login → main");
        assert_eq!(second.id, 2);
        assert_eq!(second.title, "Fix typo");
        assert_eq!(sim.record().unwrap().next_pr_id, 3);
        assert!(pr_list_message(sim.pull_requests()).contains("#1 [OPEN] feature/login → main"));
    }

    #[test]
    fn merged_pull_request_stays_merged() {
        let mut sim = RemoteSim::default();
        sim.create("site");
        sim.create_pull_request("feature/login", "main", None).unwrap();

        let merged = sim.merge_pull_request(1).unwrap();
        assert_eq!(merged.status, PrStatus::Merged);
        let merged_at = merged.merged_at;
        assert!(merged_at.is_some());

        let again = sim.merge_pull_request(1).unwrap();
        assert_eq!(again.status, PrStatus::Merged);
        assert_eq!(again.merged_at, merged_at);

        assert!(matches!(
            sim.merge_pull_request(9),
            Err(CommandError::Remote(_))
        ));
    }

    #[test]
    fn republish_requires_publish() {
        let mut sim = RemoteSim::default();
        sim.create("site");

        assert!(matches!(sim.pages_republish(), Err(CommandError::Remote(_))));

        sim.pages_publish().unwrap();
        let remote = sim.record().unwrap();
        assert_eq!(remote.pages_url.as_deref(), Some("https://pages-sim.local/site"));
        assert!(remote.pages_published_at.is_some());
        assert!(remote.pages_last_update.is_none());

        sim.pages_republish().unwrap();
        assert!(sim.record().unwrap().pages_last_update.is_some());
    }

    #[test]
    fn status_lists_pushed_commits() {
        let (mut fs, graph) = repo();
        commit(&mut fs, &graph, "first commit");
        let mut sim = RemoteSim::default();
        sim.create("site");
        assert!(sim.status().contains("(nothing pushed yet)"));

        sim.push(&graph, &fs, ORIGIN, "main").unwrap();

        let status = sim.status();
        assert!(status.contains("Last pushed branch: main"));
        assert!(status.contains("  first commit"));
    }
}
