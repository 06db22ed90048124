//! Command-level version-control operations.
//!
//! [`Vcs`] turns one learner command into engine and [`RefStore`] calls and
//! renders the outcome as display text. Engine failures are translated into
//! [`CommandError`]s carrying guidance instead of raw messages.

use tracing::debug;

use crate::error::{CommandError, Result};
use crate::graph::{
    self, Author, Commit, CommitGraph, DEFAULT_BRANCH, GraphError, META_DIR, MergeOutcome,
    StageState, StatusRow, WorkdirState, has_conflict_markers, short_id,
};
use crate::model::RemoteRepository;
use crate::refs::{RefError, RefStore};
use crate::vfs::Vfs;

/// Refs `log` tries after the requested one, in order.
pub const LOG_FALLBACK_REFS: [&str; 3] = ["main", "master", "HEAD"];

/// The refs `log` tries for an explicit or implied starting point.
pub fn log_candidates(requested: Option<&str>) -> Vec<String> {
    let mut candidates: Vec<String> = requested.map(str::to_string).into_iter().collect();
    for fallback in LOG_FALLBACK_REFS {
        if !candidates.iter().any(|c| c == fallback) {
            candidates.push(fallback.to_string());
        }
    }
    candidates
}

/// History reachable from `reference`, empty when it does not resolve yet.
pub fn history(graph: &dyn CommitGraph, fs: &Vfs, reference: &str) -> graph::Result<Vec<Commit>> {
    match graph.log(fs, reference) {
        Ok(commits) => Ok(commits),
        Err(GraphError::RefNotFound(_)) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

/// Working-tree files that still contain conflict markers, relative to `root`.
pub fn files_with_conflict_markers(fs: &Vfs, root: &str) -> Result<Vec<String>> {
    let mut hits = Vec::new();
    for rel in fs.walk_files(root, &[META_DIR])? {
        let Ok(text) = fs.read_to_string(&format!("{root}/{rel}")) else {
            continue;
        };
        if has_conflict_markers(&text) {
            hits.push(rel);
        }
    }
    Ok(hits)
}

/// The facade every git-like command goes through.
pub struct Vcs<'a> {
    graph: &'a dyn CommitGraph,
    refs: RefStore<'a>,
    root: &'a str,
    author: &'a Author,
}

impl<'a> Vcs<'a> {
    pub fn new(graph: &'a dyn CommitGraph, root: &'a str, author: &'a Author) -> Self {
        Self {
            graph,
            refs: RefStore::new(graph, root),
            root,
            author,
        }
    }

    /// True once `init` has run: `HEAD` is readable.
    pub fn is_initialized(&self, fs: &Vfs) -> bool {
        self.graph.is_initialized(fs)
    }

    /// The branch `HEAD` is on, or `HEAD` when detached.
    fn current_label(&self, fs: &Vfs) -> Result<String> {
        Ok(self
            .graph
            .current_branch(fs)?
            .unwrap_or_else(|| "HEAD".to_string()))
    }

    // ── Repository ──

    pub fn init(&self, fs: &mut Vfs) -> Result<String> {
        let existed = self.graph.is_initialized(fs);
        self.graph.init(fs, DEFAULT_BRANCH)?;
        Ok(if existed {
            format!("Reinitialized existing Git repository in {}/{META_DIR}/", self.root)
        } else {
            format!("Initialized empty Git repository in {}/{META_DIR}/", self.root)
        })
    }

    pub fn status(&self, fs: &Vfs) -> Result<String> {
        let head = self.refs.resolve_head(fs)?;
        let mut out = match (&head.branch, &head.commit) {
            (Some(branch), _) => vec![format!("On branch {branch}")],
            (None, Some(id)) => vec![format!("HEAD detached at {}", short_id(id))],
            (None, None) => vec!["HEAD detached".to_string()],
        };
        if head.commit.is_none() {
            out.push(String::new());
            out.push("No commits yet".to_string());
        }

        let unmerged = self
            .graph
            .merge_in_progress(fs)?
            .map(|state| state.conflicts)
            .unwrap_or_default();
        let rows: Vec<StatusRow> = self
            .graph
            .status_matrix(fs)?
            .into_iter()
            .filter(|row| !row.is_clean() && !unmerged.contains(&row.path))
            .collect();
        let summary = StatusSummary::from_rows(&rows);

        if !unmerged.is_empty() {
            out.push(String::new());
            out.push("You have unmerged paths.".to_string());
            out.push("  (fix conflicts and run \"git add <file>\", then \"git commit\")".to_string());
            out.push("Unmerged paths:".to_string());
            out.extend(unmerged.iter().map(|p| format!("  both modified:   {p}")));
        }
        if !summary.staged.is_empty() {
            out.push(String::new());
            out.push("Changes to be committed:".to_string());
            out.extend(summary.staged.iter().map(|(k, p)| format!("  {k:<12}{p}")));
        }
        if !summary.unstaged.is_empty() {
            out.push(String::new());
            out.push("Changes not staged for commit:".to_string());
            out.extend(summary.unstaged.iter().map(|(k, p)| format!("  {k:<12}{p}")));
        }
        if !summary.untracked.is_empty() {
            out.push(String::new());
            out.push("Untracked files:".to_string());
            out.push("  (use \"git add <file>\" to include in what will be committed)".to_string());
            out.extend(summary.untracked.iter().map(|p| format!("  {p}")));
        }
        if rows.is_empty() && unmerged.is_empty() {
            out.push(String::new());
            out.push("nothing to commit, working tree clean".to_string());
        }
        Ok(out.join("\n"))
    }

    pub fn add(&self, fs: &mut Vfs, path: &str) -> Result<String> {
        self.graph.add_to_index(fs, path)?;
        Ok(format!("Added to index: {path}"))
    }

    /// Stages every change in the working tree, deletions included.
    pub fn add_all(&self, fs: &mut Vfs) -> Result<String> {
        self.graph.add_to_index(fs, ".")?;
        let staged: Vec<String> = self
            .graph
            .status_matrix(fs)?
            .into_iter()
            .filter(|row| match row.stage {
                StageState::Absent => row.in_head,
                StageState::MatchesHead => false,
                StageState::MatchesWorkdir | StageState::Diverged => true,
            })
            .map(|row| row.path)
            .collect();
        if staged.is_empty() {
            return Ok("Nothing new to add: the index already matches the working tree.".into());
        }
        let mut out = vec!["Added to index:".to_string()];
        out.extend(staged.iter().map(|p| format!("  {p}")));
        Ok(out.join("\n"))
    }

    pub fn commit(&self, fs: &mut Vfs, message: &str) -> Result<String> {
        let head = self.refs.resolve_head(fs)?;
        let id = self.graph.commit(fs, message, self.author)?;
        let short = short_id(&id);
        let label = match (&head.branch, head.commit.is_none()) {
            (Some(branch), true) => format!("{branch} (root-commit) {short}"),
            (Some(branch), false) => format!("{branch} {short}"),
            (None, _) => format!("detached HEAD {short}"),
        };
        Ok(format!("[{label}] {message}"))
    }

    /// History of `reference` (the current branch when omitted), newest first.
    ///
    /// Falls back through [`LOG_FALLBACK_REFS`] when the starting point does
    /// not resolve. A branch with no commits is reported, not an error.
    pub fn log(&self, fs: &Vfs, reference: Option<&str>) -> Result<String> {
        let head = self.refs.resolve_head(fs)?;
        let requested = reference.map(str::to_string).or_else(|| head.branch.clone());

        if let Some(name) = &requested {
            let unborn_current = reference.is_none() && head.commit.is_none();
            let unborn_named = matches!(
                self.refs.read_branch(fs, name),
                Ok(branch) if branch.target.is_none()
            );
            if unborn_current || unborn_named {
                return Ok(no_commits_on(name));
            }
        }

        for candidate in log_candidates(requested.as_deref()) {
            match self.graph.log(fs, &candidate) {
                Ok(commits) if !commits.is_empty() => {
                    debug!(reference = %candidate, commits = commits.len(), "log resolved");
                    return Ok(render_log(&commits));
                }
                Ok(_) | Err(GraphError::RefNotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(no_commits_on(requested.as_deref().unwrap_or(DEFAULT_BRANCH)))
    }

    // ── Branches ──

    pub fn branch_list(&self, fs: &Vfs) -> Result<String> {
        let branches = self.refs.list_branches(fs)?;
        if branches.is_empty() {
            return Ok("No branches yet. Make a first commit or create one with: git branch <name>".into());
        }
        Ok(branches
            .iter()
            .map(|b| {
                if b.current {
                    format!("* {}", b.name)
                } else {
                    format!("  {}", b.name)
                }
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub fn branch_create(&self, fs: &mut Vfs, name: &str) -> Result<String> {
        if self.refs.branch_exists(fs, name) {
            return Err(CommandError::Engine(format!(
                "a branch named '{name}' already exists"
            )));
        }
        let created = self.refs.create_branch(fs, name, None)?;
        Ok(match created.target {
            Some(_) => format!("Created branch: {name}"),
            None => format!(
                "Created branch: {name}\nIt has no commits yet: switch to it and your next commit starts it."
            ),
        })
    }

    pub fn checkout(&self, fs: &mut Vfs, name: &str) -> Result<String> {
        if self.graph.current_branch(fs)?.as_deref() == Some(name) {
            return Ok(format!("Already on '{name}'"));
        }
        match self.refs.checkout(fs, name) {
            Ok(()) => Ok(format!("Switched to branch '{name}'")),
            Err(RefError::NotFound(_)) => Err(CommandError::Engine(format!(
                "pathspec '{name}' did not match any branch.\nCreate it with: git checkout -b {name}"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// `checkout -b`: creates the branch at `HEAD` and switches to it.
    pub fn checkout_new(&self, fs: &mut Vfs, name: &str) -> Result<String> {
        if self.refs.branch_exists(fs, name) {
            return Err(CommandError::Engine(format!(
                "a branch named '{name}' already exists"
            )));
        }
        self.refs.create_branch(fs, name, None)?;
        self.refs.checkout(fs, name)?;
        Ok(format!("Switched to a new branch '{name}'"))
    }

    /// Moves `HEAD` onto a commit, detaching it.
    pub fn checkout_commit(&self, fs: &mut Vfs, id: &str) -> Result<String> {
        let full = match self.graph.expand_id(fs, id) {
            Ok(full) => full,
            Err(GraphError::RefNotFound(_)) => {
                return Err(CommandError::Engine(format!("no commit matches '{id}'")));
            }
            Err(e) => return Err(e.into()),
        };
        self.graph.checkout(fs, &full)?;
        Ok([
            format!("Moved to commit {}.", short_id(&full)),
            "You are in 'detached HEAD' state.".to_string(),
            format!("To return to a branch: git checkout {DEFAULT_BRANCH}"),
        ]
        .join("\n"))
    }

    // ── Merging ──

    pub fn merge(&self, fs: &mut Vfs, theirs: &str) -> Result<String> {
        let ours = self.current_label(fs)?;
        match self.graph.merge(fs, theirs, self.author) {
            Ok(MergeOutcome::FastForward { to }) => Ok(format!(
                "Fast-forward merge completed.\nBranch {ours} now points at the same commit as {theirs} ({}).",
                short_id(&to)
            )),
            Ok(MergeOutcome::MergeCommit { id }) => Ok(format!(
                "Merge completed: integrated '{theirs}' into '{ours}'.\nNew merge commit: {id}"
            )),
            Ok(MergeOutcome::AlreadyUpToDate) => Ok("Already up to date.".to_string()),
            Err(GraphError::MergeConflict { paths }) => Err(CommandError::MergeConflict {
                ours,
                theirs: theirs.to_string(),
                paths,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Lists working-tree files that still carry conflict markers.
    pub fn conflicts(&self, fs: &Vfs) -> Result<String> {
        let files = files_with_conflict_markers(fs, self.root)?;
        if files.is_empty() {
            return Ok("No files with conflict markers.".to_string());
        }
        let mut out = vec!["Files with conflict markers:".to_string()];
        out.extend(files.iter().map(|f| format!("  - {f}")));
        out.extend(
            [
                "",
                "To resolve them:",
                "  1. Edit each file, keep the right version and delete the markers.",
                "  2. Run: git add <file>",
                "  3. Run: git commit -m \"Resolve merge conflict\"",
            ]
            .map(str::to_string),
        );
        Ok(out.join("\n"))
    }

    // ── Remotes ──

    pub fn remote_add(&self, fs: &mut Vfs, name: &str, url: &str) -> Result<String> {
        self.graph.add_remote(fs, name, url)?;
        Ok(format!("Remote added: {name} -> {url}"))
    }

    pub fn remote_remove(&self, fs: &mut Vfs, name: &str) -> Result<String> {
        self.graph.delete_remote(fs, name)?;
        Ok(format!("Remote removed: {name}"))
    }

    pub fn remote_list(&self, fs: &Vfs) -> Result<String> {
        let remotes = self.graph.list_remotes(fs)?;
        if remotes.is_empty() {
            return Ok("No remotes configured.".to_string());
        }
        Ok(remotes
            .iter()
            .flat_map(|r| {
                [
                    format!("{}\t{} (fetch)", r.name, r.url),
                    format!("{}\t{} (push)", r.name, r.url),
                ]
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    /// Reports how many of the remote's commits are missing locally.
    ///
    /// Nothing is transferred: the remote only ever holds commits pushed
    /// from this repository.
    pub fn pull(
        &self,
        fs: &Vfs,
        remote: Option<&RemoteRepository>,
        remote_name: &str,
        branch: &str,
    ) -> Result<String> {
        let remote = remote.ok_or(CommandError::RemoteNotFound)?;
        if remote.commits.is_empty() {
            return Ok("The remote has no commits to pull.".to_string());
        }
        let local = history(self.graph, fs, "HEAD")?;
        let missing = remote
            .commits
            .iter()
            .filter(|rc| !local.iter().any(|c| c.id == rc.oid))
            .count();
        if missing == 0 {
            return Ok("Already up to date with the remote.".to_string());
        }
        Ok([
            format!("Pulled from {remote_name}/{branch} (simulated)."),
            format!("Fetched {missing} new commit(s)."),
            "In a real repository this would fetch and merge automatically.".to_string(),
        ]
        .join("\n"))
    }

    /// Initializes the repository and points `origin` at the simulated remote.
    pub fn clone_from(
        &self,
        fs: &mut Vfs,
        remote: Option<&RemoteRepository>,
        url: &str,
    ) -> Result<String> {
        let remote = remote.ok_or(CommandError::RemoteNotFound)?;
        if !remote.matches_url(url) {
            return Err(CommandError::Remote(format!(
                "fatal: repository '{url}' not found\nThe simulated remote lives at: {}",
                remote.url
            )));
        }
        if remote.commits.is_empty() {
            return Err(CommandError::Remote(
                "The remote has no commits to clone yet. Push something first.".to_string(),
            ));
        }

        self.graph.init(fs, DEFAULT_BRANCH)?;
        let existing = self.graph.list_remotes(fs)?;
        match existing.iter().find(|r| r.name == "origin") {
            Some(origin) if origin.url == remote.url => {}
            Some(_) => {
                self.graph.delete_remote(fs, "origin")?;
                self.graph.add_remote(fs, "origin", &remote.url)?;
            }
            None => self.graph.add_remote(fs, "origin", &remote.url)?,
        }
        debug!(remote = %remote.name, "cloned");
        Ok([
            format!("Cloning from {url}..."),
            format!("Cloned repository: {}", remote.name),
            format!("{} commit(s) available.", remote.commits.len()),
        ]
        .join("\n"))
    }
}

fn no_commits_on(branch: &str) -> String {
    format!("Your branch '{branch}' does not have any commits yet.")
}

fn render_log(commits: &[Commit]) -> String {
    commits
        .iter()
        .map(|c| {
            let mut entry = vec![format!("commit {}", c.id)];
            if c.is_merge() {
                let parents: Vec<&str> = c.parent_ids.iter().map(|p| short_id(p)).collect();
                entry.push(format!("Merge: {}", parents.join(" ")));
            }
            entry.push(format!("Author: {} <{}>", c.author.name, c.author.email));
            entry.push(format!("Date:   {}", c.timestamp));
            entry.push(String::new());
            entry.extend(c.message.lines().map(|l| format!("    {l}")));
            entry.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Status rows sorted into the three sections `git status` prints.
#[derive(Debug, Default)]
struct StatusSummary {
    staged: Vec<(&'static str, String)>,
    unstaged: Vec<(&'static str, String)>,
    untracked: Vec<String>,
}

impl StatusSummary {
    fn from_rows(rows: &[StatusRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            let path = row.path.clone();
            let tracked_by_index = row.stage != StageState::Absent;

            match (row.in_head, row.stage) {
                (false, StageState::Absent) | (true, StageState::MatchesHead) => {}
                (false, _) => summary.staged.push(("new file:", path.clone())),
                (true, StageState::Absent) => summary.staged.push(("deleted:", path.clone())),
                (true, _) => summary.staged.push(("modified:", path.clone())),
            }

            if tracked_by_index {
                match (row.workdir, row.stage) {
                    (WorkdirState::Absent, _) => summary.unstaged.push(("deleted:", path)),
                    (WorkdirState::Modified, StageState::MatchesHead)
                    | (_, StageState::Diverged) => summary.unstaged.push(("modified:", path)),
                    _ => {}
                }
            } else if row.workdir != WorkdirState::Absent {
                summary.untracked.push(path);
            }
        }
        summary
    }
}
