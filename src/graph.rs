//! Commit-graph engine: the object-store primitives every command builds on.
//!
//! [`CommitGraph`] is the seam between the command layer and whatever keeps
//! commits, trees and refs. Every operation receives the filesystem it works
//! on, so the engine itself holds no state beyond the repository root.
//! [`VfsGraph`] is the implementation used everywhere: a small
//! content-addressed store living in the repository's metadata subtree.
//!
//! The command layer never hashes objects or diffs trees itself.

mod local;
mod merge;
mod objects;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::vfs::{FsError, Vfs};

pub use local::VfsGraph;
pub use merge::has_conflict_markers;

/// Root of the learner's repository inside the virtual filesystem.
pub const REPO_DIR: &str = "/repo";

/// Name of the metadata subtree below the repository root.
pub const META_DIR: &str = ".git";

/// Branch created by `init`.
pub const DEFAULT_BRANCH: &str = "main";

/// A full 40-character hex commit id.
pub type CommitId = String;

/// Errors raised by the commit-graph engine.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("not a repository (or HEAD is missing): {0}")]
    NotARepository(String),

    #[error("could not resolve ref '{0}'")]
    RefNotFound(String),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("short id '{0}' is ambiguous")]
    AmbiguousId(String),

    #[error("pathspec '{0}' did not match any files")]
    PathNotFound(String),

    #[error("your local changes to the following files would be overwritten: {}", .0.join(", "))]
    WouldOverwrite(Vec<String>),

    #[error("committing is not possible because you have unmerged files: {}", .0.join(", "))]
    UnmergedPaths(Vec<String>),

    #[error("merge conflict in {}", .paths.join(", "))]
    MergeConflict { paths: Vec<String> },

    #[error("merge not supported: {0}")]
    MergeUnsupported(String),

    #[error("remote '{0}' already exists")]
    RemoteExists(String),

    #[error("no such remote: '{0}'")]
    RemoteNotFound(String),

    #[error("corrupt repository data: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, GraphError>;

/// Who wrote a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// An immutable commit, as read back from the object store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub id: CommitId,
    pub message: String,
    pub author: Author,
    pub parent_ids: Vec<CommitId>,
    pub tree: String,
    pub timestamp: Timestamp,
}

impl Commit {
    /// The first seven characters of the id, for display.
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }
}

/// The first seven characters of a commit id.
pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(7)]
}

/// How a path's working-tree copy compares to `HEAD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkdirState {
    Absent,
    /// Same content as in `HEAD`.
    Unchanged,
    /// Present, and different from `HEAD` (or not in `HEAD` at all).
    Modified,
}

/// How a path's index entry compares to `HEAD` and the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    Absent,
    /// Same content as in `HEAD`.
    MatchesHead,
    /// Same content as the working tree, different from `HEAD`.
    MatchesWorkdir,
    /// Different from both.
    Diverged,
}

/// One row of the status matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub path: String,
    pub in_head: bool,
    pub workdir: WorkdirState,
    pub stage: StageState,
}

impl StatusRow {
    /// True when the path is tracked and identical in `HEAD`, index and working tree.
    pub fn is_clean(&self) -> bool {
        self.in_head
            && self.workdir == WorkdirState::Unchanged
            && self.stage == StageState::MatchesHead
    }
}

/// The canonical outcomes of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Ours moved to theirs' tip; no commit was created.
    FastForward { to: CommitId },
    /// A new commit with two parents was created.
    MergeCommit { id: CommitId },
    /// Theirs is already contained in ours.
    AlreadyUpToDate,
}

/// A merge that stopped on conflicts and waits for the next commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeState {
    pub theirs: CommitId,
    /// Message the concluding commit uses when none is given.
    pub message: String,
    pub conflicts: Vec<String>,
}

/// A configured remote pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub name: String,
    pub url: String,
}

/// The primitives the command layer needs from a commit-graph engine.
pub trait CommitGraph {
    /// Creates the metadata subtree. Idempotent: an existing repository is left as is.
    fn init(&self, fs: &mut Vfs, default_branch: &str) -> Result<()>;

    /// True when `HEAD` can be read.
    fn is_initialized(&self, fs: &Vfs) -> bool;

    /// Stages a working-tree path. A path deleted from the working tree is
    /// staged as a removal.
    fn add_to_index(&self, fs: &mut Vfs, path: &str) -> Result<()>;

    /// Drops a path from the index, leaving the working tree alone.
    fn remove_from_index(&self, fs: &mut Vfs, path: &str) -> Result<()>;

    /// Records a commit of the index on whatever `HEAD` points at.
    fn commit(&self, fs: &mut Vfs, message: &str, author: &Author) -> Result<CommitId>;

    /// Full history reachable from `reference`, newest first.
    fn log(&self, fs: &Vfs, reference: &str) -> Result<Vec<Commit>>;

    /// Resolves `HEAD`, a branch, a full ref name or a full commit id.
    fn resolve_ref(&self, fs: &Vfs, reference: &str) -> Result<CommitId>;

    /// Expands an abbreviated commit id.
    fn expand_id(&self, fs: &Vfs, prefix: &str) -> Result<CommitId>;

    fn read_commit(&self, fs: &Vfs, id: &str) -> Result<Commit>;

    /// Branches whose ref resolves to a commit.
    fn list_branches(&self, fs: &Vfs) -> Result<Vec<String>>;

    /// The branch `HEAD` is attached to, or `None` when detached.
    fn current_branch(&self, fs: &Vfs) -> Result<Option<String>>;

    /// Materializes the tree of `reference` and moves `HEAD` to it.
    ///
    /// A branch name attaches `HEAD`; anything else detaches it.
    fn checkout(&self, fs: &mut Vfs, reference: &str) -> Result<()>;

    /// Merges `theirs` into the checked-out branch. Merge commits are always allowed.
    fn merge(&self, fs: &mut Vfs, theirs: &str, author: &Author) -> Result<MergeOutcome>;

    fn merge_in_progress(&self, fs: &Vfs) -> Result<Option<MergeState>>;

    /// One row per path known to `HEAD`, the index or the working tree.
    fn status_matrix(&self, fs: &Vfs) -> Result<Vec<StatusRow>>;

    /// Paths in the tree of `reference`.
    fn list_files(&self, fs: &Vfs, reference: &str) -> Result<Vec<String>>;

    fn add_remote(&self, fs: &mut Vfs, name: &str, url: &str) -> Result<()>;

    fn delete_remote(&self, fs: &mut Vfs, name: &str) -> Result<()>;

    fn list_remotes(&self, fs: &Vfs) -> Result<Vec<RemoteConfig>>;
}
