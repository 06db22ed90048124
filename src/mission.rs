//! Mission validators.
//!
//! Every validator is a read-only predicate over the repository and the
//! simulated remote, recomputed from scratch on each call. Nothing here is
//! cached, so a poller may call [`MissionContext::validate`] as often as it
//! likes.

use std::collections::BTreeSet;

use crate::graph::{Commit, CommitGraph, DEFAULT_BRANCH, REPO_DIR};
use crate::model::{Mission, PrStatus, RemoteRepository, ValidationResult};
use crate::refs::RefStore;
use crate::vcs::{files_with_conflict_markers, history};
use crate::vfs::Vfs;

/// Branch prefix the ritual is played on.
pub const RITUAL_PREFIX: &str = "rescue/";

/// Commit messages that complete the ritual.
pub const RITUAL_CLUES: [&str; 3] = ["clue:1", "clue:2", "clue:3"];

/// Progress of the ritual.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RitualState {
    /// No `rescue/` branch yet.
    NoBranch,
    /// A branch exists; these clues are still missing.
    Gathering { missing: Vec<String> },
    Complete,
}

/// A commit found on a ritual branch, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RitualCommit {
    pub short_id: String,
    pub message: String,
    pub branch: String,
}

/// Result of a required-commit-set check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSetCheck {
    /// Branches matching the prefix, sorted.
    pub branches: Vec<String>,
    /// Required messages not found on any of them, in the order required.
    pub missing: Vec<String>,
}

impl CommitSetCheck {
    pub fn is_complete(&self) -> bool {
        !self.branches.is_empty() && self.missing.is_empty()
    }
}

/// Everything a validator may look at.
#[derive(Clone, Copy)]
pub struct MissionContext<'a> {
    pub fs: &'a Vfs,
    pub graph: &'a dyn CommitGraph,
    pub remote: Option<&'a RemoteRepository>,
}

impl<'a> MissionContext<'a> {
    pub fn new(
        fs: &'a Vfs,
        graph: &'a dyn CommitGraph,
        remote: Option<&'a RemoteRepository>,
    ) -> Self {
        Self { fs, graph, remote }
    }

    /// Runs the validator bound to `key`.
    pub fn validate(&self, key: &str) -> ValidationResult {
        match key {
            "m1" => self.first_commit(),
            "m2" => self.pushed(),
            "m3" => self.second_push(),
            "m4" => self.feature_branch_pushed(),
            "m5" => self.index_heading(),
            "m6" => self.feature_merged(),
            "m7" => self.conflict_produced(),
            "m8" => self.conflict_resolved(),
            "m9" => self.pull_request_opened(),
            "m10" => self.origin_configured(),
            "m11" => self.initial_push(),
            "m12" => self.pulled(),
            "m13" => self.descriptive_message(),
            "m14" => self.three_commits(),
            "m15" => self.detached(),
            "m16" => self.back_on_main(),
            "m17" => self.cloned(),
            "m18" => self.published(),
            "m19" => self.republished(),
            "chihiro-m1" => self.ritual_branch(),
            "chihiro-m2" => self.ritual_clues(),
            other => ValidationResult::fail(format!("Unknown validator '{other}'.")),
        }
    }

    /// Validates every mission, in order.
    pub fn evaluate<'m>(&self, missions: &'m [Mission]) -> Vec<(&'m Mission, ValidationResult)> {
        missions
            .iter()
            .map(|m| (m, self.validate(&m.validator_key)))
            .collect()
    }

    // ── Ritual ──

    /// Collects the messages of every commit on branches starting with
    /// `prefix` and reports which of `required` are absent. Order and
    /// branch distribution do not matter.
    pub fn required_commit_set(&self, prefix: &str, required: &[&str]) -> CommitSetCheck {
        let branches = self.branches_with_prefix(prefix);
        let messages: BTreeSet<String> = branches
            .iter()
            .flat_map(|b| self.log(b))
            .map(|c| c.message.trim().to_string())
            .collect();
        let missing = required
            .iter()
            .filter(|r| !messages.contains(**r))
            .map(|r| (*r).to_string())
            .collect();
        CommitSetCheck { branches, missing }
    }

    pub fn ritual_state(&self) -> RitualState {
        let check = self.required_commit_set(RITUAL_PREFIX, &RITUAL_CLUES);
        if check.branches.is_empty() {
            RitualState::NoBranch
        } else if check.missing.is_empty() {
            RitualState::Complete
        } else {
            RitualState::Gathering {
                missing: check.missing,
            }
        }
    }

    pub fn is_ritual_complete(&self) -> bool {
        self.ritual_state() == RitualState::Complete
    }

    /// Commits on every ritual branch, newest first within each branch.
    pub fn ritual_commits(&self) -> Vec<RitualCommit> {
        self.branches_with_prefix(RITUAL_PREFIX)
            .into_iter()
            .flat_map(|branch| {
                self.log(&branch)
                    .into_iter()
                    .map(move |c| RitualCommit {
                        short_id: c.short_id().to_string(),
                        message: c.message.trim().to_string(),
                        branch: branch.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    // ── Queries ──

    fn log(&self, reference: &str) -> Vec<Commit> {
        history(self.graph, self.fs, reference).unwrap_or_default()
    }

    fn head_log(&self) -> Vec<Commit> {
        self.log("HEAD")
    }

    /// Branches including those without commits.
    fn branches(&self) -> Vec<String> {
        RefStore::new(self.graph, REPO_DIR)
            .list_branches(self.fs)
            .map(|entries| entries.into_iter().map(|e| e.name).collect())
            .unwrap_or_default()
    }

    fn branches_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.branches()
            .into_iter()
            .filter(|b| b.starts_with(prefix))
            .collect()
    }

    fn branch_tip(&self, branch: &str) -> Option<String> {
        self.graph
            .resolve_ref(self.fs, &format!("refs/heads/{branch}"))
            .ok()
    }

    fn current_branch(&self) -> Option<Option<String>> {
        self.graph.current_branch(self.fs).ok()
    }

    // ── Local history ──

    fn first_commit(&self) -> ValidationResult {
        let mut errors = Vec::new();
        if !self.fs.is_file(&format!("{REPO_DIR}/index.html")) {
            errors.push("You have not created \"index.html\" in the repository.".to_string());
        }
        let log = self.head_log();
        let Some(last) = log.first() else {
            errors.push("You have not made any commit yet.".to_string());
            return ValidationResult::from_errors(errors);
        };
        if !last.message.to_lowercase().contains("first commit") {
            errors.push(
                "The message of the latest commit must contain the phrase \"first commit\"."
                    .to_string(),
            );
        }
        ValidationResult::from_errors(errors)
    }

    fn three_commits(&self) -> ValidationResult {
        let count = self.head_log().len();
        if count < 3 {
            return ValidationResult::fail(format!(
                "You need at least 3 commits. You have {count} so far."
            ));
        }
        ValidationResult::pass()
    }

    fn detached(&self) -> ValidationResult {
        match self.current_branch() {
            Some(None) => ValidationResult::pass(),
            _ => ValidationResult::fail(
                "You are not in detached HEAD. Use git log to find an earlier commit, \
                 then git checkout <hash>.",
            ),
        }
    }

    fn back_on_main(&self) -> ValidationResult {
        match self.current_branch() {
            Some(Some(branch)) if branch == DEFAULT_BRANCH => ValidationResult::pass(),
            _ => ValidationResult::fail(
                "You are not on the main branch. Use: git checkout main",
            ),
        }
    }

    /// The latest commit's message must mention one of its files or their type.
    fn descriptive_message(&self) -> ValidationResult {
        let log = self.head_log();
        let Some(last) = log.first() else {
            return ValidationResult::fail("There are no commits yet.");
        };
        let message = last.message.to_lowercase();
        let files = self
            .graph
            .list_files(self.fs, &last.id)
            .unwrap_or_default();
        let rules: [(&str, &[&str]); 4] = [
            (".js", &["js", "javascript", "app"]),
            (".html", &["html", "index"]),
            (".css", &["css", "style"]),
            (".md", &["readme", "md"]),
        ];
        let described = rules.iter().any(|(ext, words)| {
            files.iter().any(|f| f.ends_with(ext)) && words.iter().any(|w| message.contains(w))
        });
        if described {
            ValidationResult::pass()
        } else {
            ValidationResult::fail(
                "The commit message must mention the changed file or its type \
                 (e.g. 'Add app.js', 'Update styles', 'Fix HTML').",
            )
        }
    }

    fn index_heading(&self) -> ValidationResult {
        let path = format!("{REPO_DIR}/index.html");
        if !self.fs.is_file(&path) {
            return ValidationResult::fail("\"index.html\" was not found in /repo.");
        }
        let html = match self.fs.read_to_string(&path) {
            Ok(html) => html,
            Err(e) => return ValidationResult::fail(format!("Could not read index.html: {e}")),
        };
        let mut errors = Vec::new();
        let trimmed = html.trim();
        if trimmed.is_empty() {
            errors.push("index.html is empty. Write some content.".to_string());
        }
        match h1_text(trimmed) {
            None => errors.push(
                "No <h1> heading in index.html. Add one with a main title.".to_string(),
            ),
            Some(text) if !text.to_lowercase().contains("git") => errors.push(
                "The <h1> text should mention \"Git\" (for example: \"My first page with Git\")."
                    .to_string(),
            ),
            Some(_) => {}
        }
        ValidationResult::from_errors(errors)
    }

    // ── Branches and merges ──

    fn feature_branch_pushed(&self) -> ValidationResult {
        let feature = "feature/login";
        let mut errors = Vec::new();
        if !self.branches().iter().any(|b| b == feature) {
            errors.push(format!(
                "You have not created the branch \"{feature}\". Use: git branch {feature}"
            ));
        }
        if self.log(feature).is_empty() {
            errors.push(format!(
                "The branch \"{feature}\" has no commits. Switch to it (git checkout {feature}) \
                 and commit at least once."
            ));
        }
        match self.remote {
            None => errors.push(no_remote()),
            Some(remote) if remote.last_pushed_branch.as_deref() != Some(feature) => {
                errors.push(format!(
                    "You have not pushed \"{feature}\". Try: git push origin {feature}"
                ));
            }
            Some(_) => {}
        }
        ValidationResult::from_errors(errors)
    }

    /// Main must contain the tip of `feature/login`.
    fn feature_merged(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let main = self.branch_tip(DEFAULT_BRANCH);
        if main.is_none() {
            errors.push(
                "The branch \"main\" was not found. Initialize the repository and commit at least once."
                    .to_string(),
            );
        }
        let feature = self.branch_tip("feature/login");
        if feature.is_none() {
            errors.push(
                "The branch \"feature/login\" was not found. Create it with: git branch feature/login"
                    .to_string(),
            );
        }
        let (Some(_), Some(feature)) = (main, feature) else {
            return ValidationResult::from_errors(errors);
        };
        if !self.log(DEFAULT_BRANCH).iter().any(|c| c.id == feature) {
            errors.push(
                "\"main\" does not contain the changes of \"feature/login\" yet. \
                 From main, run: git merge feature/login"
                    .to_string(),
            );
        }
        ValidationResult::from_errors(errors)
    }

    /// A conflict is pending now, or one was concluded with a merge commit.
    fn conflict_produced(&self) -> ValidationResult {
        let pending = self
            .graph
            .merge_in_progress(self.fs)
            .ok()
            .flatten()
            .is_some_and(|state| !state.conflicts.is_empty());
        let marked = !files_with_conflict_markers(self.fs, REPO_DIR)
            .unwrap_or_default()
            .is_empty();
        let concluded = self.head_log().iter().any(Commit::is_merge);
        if pending || marked || concluded {
            ValidationResult::pass()
        } else {
            ValidationResult::fail(
                "No conflicted files detected. Change the same line on two different \
                 branches, then merge them.",
            )
        }
    }

    fn conflict_resolved(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let marked = files_with_conflict_markers(self.fs, REPO_DIR).unwrap_or_default();
        if !marked.is_empty() {
            errors.push(format!(
                "Conflict markers (<<<<<<< ======= >>>>>>>) remain in: {}. Resolve them, then commit.",
                marked.join(", ")
            ));
        }
        let pending = self.graph.merge_in_progress(self.fs).ok().flatten().is_some();
        let concluded = self.head_log().first().is_some_and(|c| {
            c.is_merge() || c.message.to_lowercase().contains("resolve")
        });
        if pending || !concluded {
            errors.push(
                "After resolving the conflict run: git add <file> and then: \
                 git commit -m \"Resolve merge conflict\""
                    .to_string(),
            );
        }
        ValidationResult::from_errors(errors)
    }

    // ── Remote ──

    fn pushed(&self) -> ValidationResult {
        let Some(remote) = self.remote else {
            return ValidationResult::fail(no_remote());
        };
        if remote.commits.is_empty() {
            return ValidationResult::fail(
                "You have not pushed to the remote yet. Try: git push origin main",
            );
        }
        ValidationResult::pass()
    }

    fn second_push(&self) -> ValidationResult {
        let mut errors = Vec::new();
        if self.head_log().len() < 2 {
            errors.push(
                "You need at least 2 commits in the local repository. Make a second commit."
                    .to_string(),
            );
        }
        if self.remote.is_none_or(|r| r.commits.len() < 2) {
            errors.push(
                "Your simulated GitHub does not have 2 commits yet. Run git push origin main \
                 after the second commit."
                    .to_string(),
            );
        }
        ValidationResult::from_errors(errors)
    }

    fn pull_request_opened(&self) -> ValidationResult {
        let Some(remote) = self.remote else {
            return ValidationResult::fail(no_remote());
        };
        if remote.pull_requests.is_empty() {
            return ValidationResult::fail(
                "No pull requests found. Open one with:\ngithub pr create <branch> main",
            );
        }
        if !remote
            .pull_requests
            .iter()
            .any(|pr| pr.status == PrStatus::Open)
        {
            return ValidationResult::fail(
                "No open pull request found. Open one from your feature branch.",
            );
        }
        ValidationResult::pass()
    }

    fn origin_configured(&self) -> ValidationResult {
        let Ok(remotes) = self.graph.list_remotes(self.fs) else {
            return ValidationResult::fail("Could not read the remote configuration.");
        };
        let Some(origin) = remotes.iter().find(|r| r.name == "origin") else {
            return ValidationResult::fail(
                "You have not configured \"origin\". Use: git remote add origin <url>",
            );
        };
        match self.remote {
            Some(remote) if !origin.url.contains(&remote.name) => ValidationResult::fail(format!(
                "The origin URL does not match your simulated repository. Expected: {}",
                remote.url
            )),
            _ => ValidationResult::pass(),
        }
    }

    fn initial_push(&self) -> ValidationResult {
        let Some(remote) = self.remote else {
            return ValidationResult::fail(no_remote());
        };
        if remote.commits.is_empty() {
            return ValidationResult::fail(
                "You have not pushed to the remote. Run git push origin main after committing.",
            );
        }
        ValidationResult::pass()
    }

    fn pulled(&self) -> ValidationResult {
        let Some(remote) = self.remote.filter(|r| !r.commits.is_empty()) else {
            return ValidationResult::fail(
                "The remote has no commits. Push first so there is something to pull.",
            );
        };
        let local: BTreeSet<String> = self.head_log().into_iter().map(|c| c.id).collect();
        if remote.commits.iter().all(|c| local.contains(&c.oid)) {
            ValidationResult::pass()
        } else {
            ValidationResult::fail(
                "Your local repository is missing commits from the remote. Use: git pull origin main",
            )
        }
    }

    fn cloned(&self) -> ValidationResult {
        if self.remote.is_none() {
            return ValidationResult::fail(no_remote());
        }
        if self.head_log().is_empty() {
            return ValidationResult::fail("The local repository is empty. Use: git clone <url>");
        }
        ValidationResult::pass()
    }

    fn published(&self) -> ValidationResult {
        let Some(remote) = self.remote else {
            return ValidationResult::fail(no_remote());
        };
        if remote.pages_url.is_none() {
            return ValidationResult::fail("You have not published the site. Use: git pages publish");
        }
        ValidationResult::pass()
    }

    fn republished(&self) -> ValidationResult {
        let Some(remote) = self.remote else {
            return ValidationResult::fail(no_remote());
        };
        if remote.pages_url.is_none() {
            return ValidationResult::fail(
                "You have not published the site yet. Use: git pages publish",
            );
        }
        if remote.pages_last_update.is_none() {
            return ValidationResult::fail(
                "No update recorded. Use git pages republish after making changes.",
            );
        }
        if self.head_log().len() < 2 {
            return ValidationResult::fail(
                "Make at least one new commit after the first publish.",
            );
        }
        ValidationResult::pass()
    }

    // ── Chihiro ──

    fn ritual_branch(&self) -> ValidationResult {
        match self.branches_with_prefix(RITUAL_PREFIX).first() {
            Some(branch) => ValidationResult::pass_with(format!(
                "The rescue path is open on '{branch}'."
            )),
            None => ValidationResult::fail(format!(
                "No branch starting with '{RITUAL_PREFIX}' yet. Try: git checkout -b {RITUAL_PREFIX}chihiro"
            )),
        }
    }

    fn ritual_clues(&self) -> ValidationResult {
        match self.ritual_state() {
            RitualState::NoBranch => ValidationResult::fail(format!(
                "Open the rescue path first: create a '{RITUAL_PREFIX}' branch."
            )),
            RitualState::Gathering { missing } => ValidationResult::from_errors(vec![
                format!("Clues still missing: {}", missing.join(", ")),
                "Commit each clue on a rescue/ branch, e.g. git commit --allow-empty -m \"clue:1\""
                    .to_string(),
            ]),
            RitualState::Complete => {
                ValidationResult::pass_with("All three clues are gathered. The ritual is complete.")
            }
        }
    }
}

fn no_remote() -> String {
    "There is no simulated remote yet. Create one with: github create <repo-name>".to_string()
}

/// Text of the first `<h1>` element, tags matched case-insensitively.
fn h1_text(html: &str) -> Option<&str> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<h1")?;
    let after = open + lower[open..].find('>')? + 1;
    let close = after + lower[after..].find("</h1>")?;
    Some(&html[after..close])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Author, VfsGraph};
    use crate::model::{PullRequest, RemoteCommit};
    use crate::vcs::Vcs;

    fn author() -> Author {
        Author {
            name: "Tester".into(),
            email: "t@example.com".into(),
        }
    }

    fn repo() -> (Vfs, VfsGraph) {
        let mut fs = Vfs::new();
        fs.mkdir_all(REPO_DIR).unwrap();
        let graph = VfsGraph::new(REPO_DIR);
        graph.init(&mut fs, DEFAULT_BRANCH).unwrap();
        (fs, graph)
    }

    fn commit_file(fs: &mut Vfs, graph: &VfsGraph, path: &str, content: &str, message: &str) -> String {
        fs.write_file(&format!("{REPO_DIR}/{path}"), content).unwrap();
        graph.add_to_index(fs, path).unwrap();
        graph.commit(fs, message, &author()).unwrap()
    }

    fn empty_commit(fs: &mut Vfs, graph: &VfsGraph, message: &str) {
        graph.commit(fs, message, &author()).unwrap();
    }

    fn check(fs: &Vfs, graph: &VfsGraph, remote: Option<&RemoteRepository>, key: &str) -> ValidationResult {
        MissionContext::new(fs, graph, remote).validate(key)
    }

    fn remote_with(commits: &[&str]) -> RemoteRepository {
        let mut remote = RemoteRepository::new("site");
        remote.commits = commits
            .iter()
            .map(|oid| RemoteCommit {
                oid: (*oid).to_string(),
                message: "m".into(),
                author: "Tester".into(),
                timestamp: jiff::Timestamp::UNIX_EPOCH,
            })
            .collect();
        remote
    }

    #[test]
    fn unknown_key_fails() {
        let (fs, graph) = repo();
        let result = check(&fs, &graph, None, "m99");
        assert!(!result.ok);
        assert!(result.errors[0].contains("m99"));
    }

    #[test]
    fn first_commit_requires_file_and_phrase() {
        let (mut fs, graph) = repo();
        let result = check(&fs, &graph, None, "m1");
        assert_eq!(result.errors.len(), 2);

        commit_file(&mut fs, &graph, "index.html", "", "initial");
        let result = check(&fs, &graph, None, "m1");
        assert!(!result.ok);
        assert!(result.errors[0].contains("first commit"));

        commit_file(&mut fs, &graph, "index.html", "x", "My First Commit");
        assert!(check(&fs, &graph, None, "m1").ok);
    }

    #[test]
    fn index_heading_must_mention_git() {
        let (mut fs, graph) = repo();
        assert!(!check(&fs, &graph, None, "m5").ok);
        fs.write_file("/repo/index.html", "<p>nothing</p>").unwrap();
        assert!(check(&fs, &graph, None, "m5").errors[0].contains("<h1>"));
        fs.write_file("/repo/index.html", "<H1 class=\"t\">Hello</H1>").unwrap();
        assert!(check(&fs, &graph, None, "m5").errors[0].contains("Git"));
        fs.write_file("/repo/index.html", "<h1 class=\"t\">Learning GIT</h1>").unwrap();
        assert!(check(&fs, &graph, None, "m5").ok);
    }

    #[test]
    fn h1_extraction() {
        assert_eq!(h1_text("<h1>a</h1>"), Some("a"));
        assert_eq!(h1_text("x<H1 id=1>Git</h1>"), Some("Git"));
        assert_eq!(h1_text("<h1>open"), None);
        assert_eq!(h1_text("<h2>x</h2>"), None);
    }

    #[test]
    fn three_commits_then_detached_then_main() {
        let (mut fs, graph) = repo();
        let first = commit_file(&mut fs, &graph, "v.txt", "1", "v1");
        commit_file(&mut fs, &graph, "v.txt", "2", "v2");
        assert!(check(&fs, &graph, None, "m14").errors[0].contains("You have 2"));
        commit_file(&mut fs, &graph, "v.txt", "3", "v3");
        assert!(check(&fs, &graph, None, "m14").ok);

        assert!(!check(&fs, &graph, None, "m15").ok);
        assert!(check(&fs, &graph, None, "m16").ok);
        graph.checkout(&mut fs, &first).unwrap();
        assert!(check(&fs, &graph, None, "m15").ok);
        assert!(!check(&fs, &graph, None, "m16").ok);
    }

    #[test]
    fn descriptive_message_matches_file_types() {
        let (mut fs, graph) = repo();
        commit_file(&mut fs, &graph, "app.js", "", "stuff");
        assert!(!check(&fs, &graph, None, "m13").ok);
        commit_file(&mut fs, &graph, "app.js", "1", "Add app.js");
        assert!(check(&fs, &graph, None, "m13").ok);
    }

    #[test]
    fn feature_merge_accepts_later_commits_on_main() {
        let (mut fs, graph) = repo();
        let author = author();
        let vcs = Vcs::new(&graph, REPO_DIR, &author);
        commit_file(&mut fs, &graph, "index.html", "a", "first commit");
        assert!(!check(&fs, &graph, None, "m6").ok);

        vcs.checkout_new(&mut fs, "feature/login").unwrap();
        commit_file(&mut fs, &graph, "login.html", "l", "login");
        assert!(!check(&fs, &graph, None, "m6").ok);

        vcs.checkout(&mut fs, "main").unwrap();
        vcs.merge(&mut fs, "feature/login").unwrap();
        assert!(check(&fs, &graph, None, "m6").ok);

        commit_file(&mut fs, &graph, "more.txt", "m", "more");
        assert!(check(&fs, &graph, None, "m6").ok);
    }

    #[test]
    fn conflict_missions_follow_the_merge() {
        let (mut fs, graph) = repo();
        let author = author();
        let vcs = Vcs::new(&graph, REPO_DIR, &author);
        commit_file(&mut fs, &graph, "index.html", "<h1>base</h1>\n", "base");
        vcs.checkout_new(&mut fs, "conflict").unwrap();
        commit_file(&mut fs, &graph, "index.html", "<h1>theirs</h1>\n", "theirs");
        vcs.checkout(&mut fs, "main").unwrap();
        commit_file(&mut fs, &graph, "index.html", "<h1>ours!</h1>\n", "ours");

        assert!(!check(&fs, &graph, None, "m7").ok);
        assert!(vcs.merge(&mut fs, "conflict").is_err());
        assert!(check(&fs, &graph, None, "m7").ok);
        assert!(!check(&fs, &graph, None, "m8").ok);

        fs.write_file("/repo/index.html", "<h1>merged</h1>\n").unwrap();
        graph.add_to_index(&mut fs, "index.html").unwrap();
        graph.commit(&mut fs, "Merge conflict branch", &author).unwrap();
        assert!(check(&fs, &graph, None, "m7").ok);
        assert!(check(&fs, &graph, None, "m8").ok);
    }

    #[test]
    fn remote_missions() {
        let (mut fs, graph) = repo();
        assert!(check(&fs, &graph, None, "m2").errors[0].contains("github create"));
        let a = commit_file(&mut fs, &graph, "a.txt", "a", "one");

        let mut remote = remote_with(&[]);
        assert!(!check(&fs, &graph, Some(&remote), "m2").ok);
        assert!(!check(&fs, &graph, Some(&remote), "m12").ok);

        remote = remote_with(&[a.as_str()]);
        assert!(check(&fs, &graph, Some(&remote), "m2").ok);
        assert!(check(&fs, &graph, Some(&remote), "m11").ok);
        assert!(check(&fs, &graph, Some(&remote), "m12").ok);
        assert_eq!(check(&fs, &graph, Some(&remote), "m3").errors.len(), 2);

        let b = commit_file(&mut fs, &graph, "b.txt", "b", "two");
        remote = remote_with(&[b.as_str(), a.as_str()]);
        assert!(check(&fs, &graph, Some(&remote), "m3").ok);

        remote = remote_with(&["ffffffffffffffffffffffffffffffffffffffff"]);
        assert!(!check(&fs, &graph, Some(&remote), "m12").ok);
    }

    #[test]
    fn feature_push_tracks_last_pushed_branch() {
        let (mut fs, graph) = repo();
        let author = author();
        let vcs = Vcs::new(&graph, REPO_DIR, &author);
        commit_file(&mut fs, &graph, "a.txt", "a", "one");
        vcs.checkout_new(&mut fs, "feature/login").unwrap();
        commit_file(&mut fs, &graph, "login.html", "l", "login");

        let mut remote = remote_with(&[]);
        remote.last_pushed_branch = Some("main".into());
        let result = check(&fs, &graph, Some(&remote), "m4");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("git push origin feature/login"));

        remote.last_pushed_branch = Some("feature/login".into());
        assert!(check(&fs, &graph, Some(&remote), "m4").ok);
    }

    #[test]
    fn pull_request_must_be_open() {
        let (fs, graph) = repo();
        let mut remote = remote_with(&[]);
        assert!(!check(&fs, &graph, Some(&remote), "m9").ok);
        remote.pull_requests.push(PullRequest {
            id: 1,
            from_branch: "feature".into(),
            to_branch: "main".into(),
            title: "t".into(),
            status: PrStatus::Merged,
            created_at: jiff::Timestamp::UNIX_EPOCH,
            merged_at: Some(jiff::Timestamp::UNIX_EPOCH),
        });
        assert!(check(&fs, &graph, Some(&remote), "m9").errors[0].contains("open"));
        remote.pull_requests[0].status = PrStatus::Open;
        assert!(check(&fs, &graph, Some(&remote), "m9").ok);
    }

    #[test]
    fn origin_must_point_at_the_remote() {
        let (mut fs, graph) = repo();
        let remote = RemoteRepository::new("my-project");
        assert!(!check(&fs, &graph, Some(&remote), "m10").ok);
        graph.add_remote(&mut fs, "origin", "https://example.com/other.git").unwrap();
        assert!(check(&fs, &graph, Some(&remote), "m10").errors[0].contains(&remote.url));
        graph.delete_remote(&mut fs, "origin").unwrap();
        graph.add_remote(&mut fs, "origin", &remote.url).unwrap();
        assert!(check(&fs, &graph, Some(&remote), "m10").ok);
    }

    #[test]
    fn pages_missions() {
        let (mut fs, graph) = repo();
        commit_file(&mut fs, &graph, "index.html", "x", "site");
        let mut remote = remote_with(&[]);
        assert!(!check(&fs, &graph, Some(&remote), "m18").ok);

        remote.pages_url = Some(remote.site_url());
        assert!(check(&fs, &graph, Some(&remote), "m18").ok);
        assert!(check(&fs, &graph, Some(&remote), "m19").errors[0].contains("republish"));

        remote.pages_last_update = Some(jiff::Timestamp::UNIX_EPOCH);
        assert!(check(&fs, &graph, Some(&remote), "m19").errors[0].contains("new commit"));
        commit_file(&mut fs, &graph, "styles.css", "y", "styles");
        assert!(check(&fs, &graph, Some(&remote), "m19").ok);
    }

    #[test]
    fn clone_requires_remote_and_history() {
        let (mut fs, graph) = repo();
        let remote = remote_with(&[]);
        assert!(!check(&fs, &graph, None, "m17").ok);
        assert!(check(&fs, &graph, Some(&remote), "m17").errors[0].contains("git clone"));
        commit_file(&mut fs, &graph, "a.txt", "a", "one");
        assert!(check(&fs, &graph, Some(&remote), "m17").ok);
    }

    // ── Ritual ──

    fn ritual_repo() -> (Vfs, VfsGraph) {
        let (mut fs, graph) = repo();
        let refs = RefStore::new(&graph, REPO_DIR);
        refs.create_branch(&mut fs, "rescue/chihiro", None).unwrap();
        refs.checkout(&mut fs, "rescue/chihiro").unwrap();
        (fs, graph)
    }

    #[test]
    fn ritual_needs_a_rescue_branch() {
        let (fs, graph) = repo();
        let ctx = MissionContext::new(&fs, &graph, None);
        assert_eq!(ctx.ritual_state(), RitualState::NoBranch);
        assert!(!ctx.validate("chihiro-m1").ok);
        assert!(!ctx.validate("chihiro-m2").ok);
    }

    #[test]
    fn unborn_rescue_branch_counts() {
        let (fs, graph) = ritual_repo();
        let ctx = MissionContext::new(&fs, &graph, None);
        let result = ctx.validate("chihiro-m1");
        assert!(result.ok);
        assert!(result.message.unwrap().contains("rescue/chihiro"));
        assert_eq!(
            ctx.ritual_state(),
            RitualState::Gathering {
                missing: vec!["clue:1".into(), "clue:2".into(), "clue:3".into()]
            }
        );
    }

    #[test]
    fn ritual_completes_exactly_after_the_third_clue() {
        let (mut fs, graph) = ritual_repo();
        for (i, clue) in RITUAL_CLUES.iter().enumerate() {
            assert!(!MissionContext::new(&fs, &graph, None).is_ritual_complete());
            empty_commit(&mut fs, &graph, clue);
            let complete = MissionContext::new(&fs, &graph, None).is_ritual_complete();
            assert_eq!(complete, i == RITUAL_CLUES.len() - 1);
        }
        assert!(check(&fs, &graph, None, "chihiro-m2").ok);
    }

    #[test]
    fn clue_order_does_not_matter() {
        let (mut fs, graph) = ritual_repo();
        for clue in ["clue:3", "clue:1", "clue:2"] {
            empty_commit(&mut fs, &graph, clue);
        }
        assert!(MissionContext::new(&fs, &graph, None).is_ritual_complete());
    }

    #[test]
    fn unrelated_commits_are_ignored() {
        let (mut fs, graph) = ritual_repo();
        for message in ["clue:1", "lunch", "clue:2", "  clue:3  ", "clue:4"] {
            empty_commit(&mut fs, &graph, message);
        }
        let ctx = MissionContext::new(&fs, &graph, None);
        assert!(ctx.is_ritual_complete());
        assert_eq!(ctx.ritual_commits().len(), 5);
    }

    #[test]
    fn clues_may_be_spread_over_rescue_branches() {
        let (mut fs, graph) = ritual_repo();
        empty_commit(&mut fs, &graph, "clue:1");
        let refs = RefStore::new(&graph, REPO_DIR);
        refs.create_branch(&mut fs, "rescue/haku", None).unwrap();
        refs.checkout(&mut fs, "rescue/haku").unwrap();
        empty_commit(&mut fs, &graph, "clue:2");
        empty_commit(&mut fs, &graph, "clue:3");

        let ctx = MissionContext::new(&fs, &graph, None);
        let check = ctx.required_commit_set(RITUAL_PREFIX, &RITUAL_CLUES);
        assert_eq!(check.branches, ["rescue/chihiro", "rescue/haku"]);
        assert!(check.is_complete());
        let result = ctx.validate("chihiro-m2");
        assert!(result.ok);
    }

    #[test]
    fn clues_off_the_rescue_branches_do_not_count() {
        let (mut fs, graph) = repo();
        for clue in RITUAL_CLUES {
            empty_commit(&mut fs, &graph, clue);
        }
        let ctx = MissionContext::new(&fs, &graph, None);
        assert_eq!(ctx.ritual_state(), RitualState::NoBranch);
        let check = ctx.required_commit_set("main", &RITUAL_CLUES);
        assert_eq!(check.branches, ["main"]);
        assert!(check.is_complete());
    }

    #[test]
    fn missing_clues_are_listed() {
        let (mut fs, graph) = ritual_repo();
        empty_commit(&mut fs, &graph, "clue:2");
        let result = check(&fs, &graph, None, "chihiro-m2");
        assert!(!result.ok);
        assert_eq!(result.errors[0], "Clues still missing: clue:1, clue:3");
    }
}
