//! Direct manipulation of branch ref files.
//!
//! The commit-graph engine only knows branches that point at a commit. The
//! learner, however, may create `rescue/chihiro` before the first commit
//! exists and check it out. [`RefStore`] covers those cases by writing the
//! loose ref files and `HEAD` itself, and hands everything else to the engine.

use std::collections::BTreeSet;

use tracing::debug;

use crate::graph::{CommitGraph, CommitId, GraphError, META_DIR};
use crate::vfs::{FsError, Vfs};

/// Errors raised by [`RefStore`].
#[derive(Debug, thiserror::Error)]
pub enum RefError {
    #[error("cannot create '{0}': a ref with a conflicting path already exists")]
    Conflict(String),

    #[error("branch '{0}' not found")]
    NotFound(String),

    #[error("'{0}' is not a valid branch name")]
    InvalidName(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Fs(#[from] FsError),
}

pub type Result<T> = core::result::Result<T, RefError>;

/// A branch and the commit it points at (`None` until its first commit).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub name: String,
    pub target: Option<CommitId>,
}

/// One entry of a branch listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    pub name: String,
    pub current: bool,
}

/// Where `HEAD` is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadState {
    pub attached: bool,
    pub branch: Option<String>,
    pub commit: Option<CommitId>,
}

/// Reads and writes `refs/heads` and `HEAD` for one repository.
pub struct RefStore<'a> {
    graph: &'a dyn CommitGraph,
    meta: String,
}

impl<'a> RefStore<'a> {
    pub fn new(graph: &'a dyn CommitGraph, root: &str) -> Self {
        Self {
            graph,
            meta: format!("{root}/{META_DIR}"),
        }
    }

    fn heads_dir(&self) -> String {
        format!("{}/refs/heads", self.meta)
    }

    fn loose_path(&self, name: &str) -> String {
        format!("{}/{name}", self.heads_dir())
    }

    fn packed_branches(&self, fs: &Vfs) -> Vec<String> {
        let Ok(raw) = fs.read_to_string(&format!("{}/packed-refs", self.meta)) else {
            return Vec::new();
        };
        raw.lines()
            .filter_map(|line| line.split_once(' '))
            .filter_map(|(_, name)| name.trim().strip_prefix("refs/heads/"))
            .map(str::to_string)
            .collect()
    }

    /// True when a loose or packed ref exists for `name`, committed or not.
    pub fn branch_exists(&self, fs: &Vfs, name: &str) -> bool {
        fs.is_file(&self.loose_path(name)) || self.packed_branches(fs).iter().any(|b| b == name)
    }

    /// Writes a loose ref for `name`, overwriting any existing one.
    ///
    /// Without `at`, the branch starts wherever `HEAD` is; before the first
    /// commit that is nowhere, and the ref file is left empty.
    pub fn create_branch(&self, fs: &mut Vfs, name: &str, at: Option<&str>) -> Result<Ref> {
        validate_name(name)?;
        let target = match at {
            Some(reference) => Some(
                self.graph
                    .resolve_ref(fs, reference)
                    .or_else(|_| self.graph.expand_id(fs, reference))?,
            ),
            None => self.resolve_head(fs)?.commit,
        };

        let path = self.loose_path(name);
        if fs.is_dir(&path) {
            return Err(RefError::Conflict(name.to_string()));
        }
        let mut dir = self.heads_dir();
        fs.mkdir_all(&dir)?;
        let components: Vec<&str> = name.split('/').collect();
        for component in &components[..components.len() - 1] {
            dir = format!("{dir}/{component}");
            match fs.mkdir(&dir) {
                Ok(()) | Err(FsError::AlreadyExists(_)) if fs.is_dir(&dir) => {}
                Ok(()) | Err(FsError::AlreadyExists(_)) => {
                    return Err(RefError::Conflict(name.to_string()));
                }
                Err(e) => return Err(e.into()),
            }
        }
        fs.write_file(&path, target.as_ref().map_or(String::new(), |id| format!("{id}\n")))?;
        debug!(branch = name, target = ?target, "branch ref written");
        Ok(Ref {
            name: name.to_string(),
            target,
        })
    }

    /// Every branch, loose (committed or not) and packed, sorted and deduplicated.
    pub fn list_branches(&self, fs: &Vfs) -> Result<Vec<BranchEntry>> {
        let current = self.resolve_head(fs)?.branch;
        let heads = self.heads_dir();
        let mut names: BTreeSet<String> = BTreeSet::new();
        if fs.is_dir(&heads) {
            names.extend(fs.walk_files(&heads, &[])?);
        }
        names.extend(self.packed_branches(fs));
        Ok(names
            .into_iter()
            .map(|name| BranchEntry {
                current: current.as_deref() == Some(name.as_str()),
                name,
            })
            .collect())
    }

    pub fn resolve_head(&self, fs: &Vfs) -> Result<HeadState> {
        let branch = self.graph.current_branch(fs)?;
        let commit = match self.graph.resolve_ref(fs, "HEAD") {
            Ok(id) => Some(id),
            Err(GraphError::RefNotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };
        Ok(HeadState {
            attached: branch.is_some(),
            branch,
            commit,
        })
    }

    /// The branch's target, `None` for a branch with no commits yet.
    pub fn read_branch(&self, fs: &Vfs, name: &str) -> Result<Ref> {
        if !self.branch_exists(fs, name) {
            return Err(RefError::NotFound(name.to_string()));
        }
        let target = self.graph.resolve_ref(fs, &format!("refs/heads/{name}")).ok();
        Ok(Ref {
            name: name.to_string(),
            target,
        })
    }

    /// Switches to a local branch.
    ///
    /// A branch with no commits yet only needs `HEAD` pointed at it; the
    /// engine cannot check it out because there is no tree to materialize.
    pub fn checkout(&self, fs: &mut Vfs, name: &str) -> Result<()> {
        let branch = self.read_branch(fs, name)?;
        if branch.target.is_none() {
            fs.write_file(
                &format!("{}/HEAD", self.meta),
                format!("ref: refs/heads/{name}\n"),
            )?;
            debug!(branch = name, "HEAD attached to unborn branch");
            return Ok(());
        }
        self.graph.checkout(fs, name)?;
        Ok(())
    }
}

/// Rejects names git itself would refuse.
fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "HEAD"
        || name.starts_with('-')
        || name.ends_with(".lock")
        || name.contains("..")
        || name.contains("@{")
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
        || name
            .split('/')
            .any(|component| component.is_empty() || component.starts_with('.'));
    if invalid {
        return Err(RefError::InvalidName(name.to_string()));
    }
    Ok(())
}
