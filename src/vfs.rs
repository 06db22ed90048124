//! In-memory virtual filesystem.
//!
//! Every path is absolute and normalized (`/repo/src/main.rs`). The root
//! directory always exists. Operations mirror their POSIX counterparts:
//! writing a file requires its parent directory, creating a directory that
//! already exists is an error, and so on. Callers that want "create if
//! missing" semantics use [`Vfs::mkdir_all`] or swallow
//! [`FsError::AlreadyExists`] themselves.
//!
//! The whole tree is serializable so a session can be snapshotted and
//! restored between runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Errors raised by virtual filesystem operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FsError {
    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("file exists: {0}")]
    AlreadyExists(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("is a directory: {0}")]
    IsADirectory(String),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("file is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

pub type Result<T> = core::result::Result<T, FsError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum Node {
    File { content: Vec<u8> },
    Dir,
}

/// What kind of entry a path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

/// Result of [`Vfs::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub kind: EntryKind,
    pub len: u64,
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// A hierarchical, byte-addressable in-memory filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vfs {
    nodes: BTreeMap<String, Node>,
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs {
    /// Creates an empty filesystem containing only `/`.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        Self { nodes }
    }

    /// Normalizes an absolute path: collapses repeated separators, resolves
    /// `.` and `..`, and strips any trailing separator.
    pub fn normalize(path: &str) -> Result<String> {
        if !path.starts_with('/') {
            return Err(FsError::InvalidPath(path.to_string()));
        }
        let mut parts: Vec<&str> = Vec::new();
        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    parts.pop();
                }
                other => parts.push(other),
            }
        }
        Ok(format!("/{}", parts.join("/")))
    }

    /// Joins a base directory and a relative path, then normalizes.
    pub fn join(base: &str, rel: &str) -> Result<String> {
        if rel.starts_with('/') {
            return Self::normalize(rel);
        }
        Self::normalize(&format!("{base}/{rel}"))
    }

    pub fn exists(&self, path: &str) -> bool {
        Self::normalize(path).is_ok_and(|p| self.nodes.contains_key(&p))
    }

    pub fn is_dir(&self, path: &str) -> bool {
        self.stat(path).is_ok_and(|m| m.is_dir())
    }

    pub fn is_file(&self, path: &str) -> bool {
        self.stat(path).is_ok_and(|m| m.is_file())
    }

    pub fn stat(&self, path: &str) -> Result<Metadata> {
        let path = Self::normalize(path)?;
        match self.nodes.get(&path) {
            Some(Node::Dir) => Ok(Metadata {
                kind: EntryKind::Dir,
                len: 0,
            }),
            Some(Node::File { content }) => Ok(Metadata {
                kind: EntryKind::File,
                len: content.len() as u64,
            }),
            None => Err(FsError::NotFound(path)),
        }
    }

    /// Creates a single directory. The parent must exist.
    pub fn mkdir(&mut self, path: &str) -> Result<()> {
        let path = Self::normalize(path)?;
        if self.nodes.contains_key(&path) {
            return Err(FsError::AlreadyExists(path));
        }
        self.require_parent_dir(&path)?;
        self.nodes.insert(path, Node::Dir);
        Ok(())
    }

    /// Creates a directory and any missing ancestors.
    ///
    /// Existing directories along the way are fine; an existing file is not.
    pub fn mkdir_all(&mut self, path: &str) -> Result<()> {
        let path = Self::normalize(path)?;
        let mut current = String::new();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            current.push('/');
            current.push_str(part);
            match self.nodes.get(&current) {
                Some(Node::Dir) => {}
                Some(Node::File { .. }) => return Err(FsError::NotADirectory(current)),
                None => {
                    self.nodes.insert(current.clone(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    /// Writes (or overwrites) a file. The parent directory must exist.
    pub fn write_file(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<()> {
        let path = Self::normalize(path)?;
        if matches!(self.nodes.get(&path), Some(Node::Dir)) {
            return Err(FsError::IsADirectory(path));
        }
        self.require_parent_dir(&path)?;
        self.nodes.insert(
            path,
            Node::File {
                content: content.into(),
            },
        );
        Ok(())
    }

    pub fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let path = Self::normalize(path)?;
        match self.nodes.get(&path) {
            Some(Node::File { content }) => Ok(content.clone()),
            Some(Node::Dir) => Err(FsError::IsADirectory(path)),
            None => Err(FsError::NotFound(path)),
        }
    }

    pub fn read_to_string(&self, path: &str) -> Result<String> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|_| FsError::InvalidUtf8(path.to_string()))
    }

    pub fn remove_file(&mut self, path: &str) -> Result<()> {
        let path = Self::normalize(path)?;
        match self.nodes.get(&path) {
            Some(Node::File { .. }) => {
                self.nodes.remove(&path);
                Ok(())
            }
            Some(Node::Dir) => Err(FsError::IsADirectory(path)),
            None => Err(FsError::NotFound(path)),
        }
    }

    /// Removes an empty directory.
    pub fn remove_dir(&mut self, path: &str) -> Result<()> {
        let path = Self::normalize(path)?;
        match self.nodes.get(&path) {
            Some(Node::Dir) => {
                if self.children(&path).next().is_some() {
                    return Err(FsError::NotEmpty(path));
                }
                if path != "/" {
                    self.nodes.remove(&path);
                }
                Ok(())
            }
            Some(Node::File { .. }) => Err(FsError::NotADirectory(path)),
            None => Err(FsError::NotFound(path)),
        }
    }

    /// Removes a directory and everything below it. Removing `/` empties the
    /// filesystem but keeps the root itself.
    pub fn remove_dir_all(&mut self, path: &str) -> Result<()> {
        let path = Self::normalize(path)?;
        match self.nodes.get(&path) {
            Some(Node::Dir) => {}
            Some(Node::File { .. }) => return Err(FsError::NotADirectory(path)),
            None => return Err(FsError::NotFound(path)),
        }
        let prefix = descendant_prefix(&path);
        self.nodes.retain(|p, _| !p.starts_with(&prefix));
        if path != "/" {
            self.nodes.remove(&path);
        }
        Ok(())
    }

    /// Lists the names of a directory's direct children, sorted.
    pub fn read_dir(&self, path: &str) -> Result<Vec<String>> {
        let path = Self::normalize(path)?;
        match self.nodes.get(&path) {
            Some(Node::Dir) => Ok(self.children(&path).map(str::to_string).collect()),
            Some(Node::File { .. }) => Err(FsError::NotADirectory(path)),
            None => Err(FsError::NotFound(path)),
        }
    }

    /// Returns every file below `root`, as paths relative to it, sorted.
    ///
    /// `skip` names directories (relative to `root`) whose subtrees are left out.
    pub fn walk_files(&self, root: &str, skip: &[&str]) -> Result<Vec<String>> {
        let root = Self::normalize(root)?;
        if !self.is_dir(&root) {
            return Err(FsError::NotADirectory(root));
        }
        let prefix = descendant_prefix(&root);
        let files = self
            .nodes
            .range(prefix.clone()..)
            .take_while(|(p, _)| p.starts_with(&prefix))
            .filter(|(_, node)| matches!(node, Node::File { .. }))
            .map(|(p, _)| p[prefix.len()..].to_string())
            .filter(|rel| {
                !skip
                    .iter()
                    .any(|s| rel == s || rel.starts_with(&format!("{s}/")))
            })
            .collect();
        Ok(files)
    }

    fn children<'a>(&'a self, dir: &str) -> impl Iterator<Item = &'a str> {
        let prefix = descendant_prefix(dir);
        let skip = prefix.len();
        self.nodes
            .range(prefix.clone()..)
            .take_while(move |(p, _)| p.starts_with(&prefix))
            .filter_map(move |(p, _)| {
                let rest = &p[skip..];
                (!rest.is_empty() && !rest.contains('/')).then_some(rest)
            })
    }

    fn require_parent_dir(&self, path: &str) -> Result<()> {
        let parent = parent_of(path);
        match self.nodes.get(parent) {
            Some(Node::Dir) => Ok(()),
            Some(Node::File { .. }) => Err(FsError::NotADirectory(parent.to_string())),
            None => Err(FsError::NotFound(parent.to_string())),
        }
    }
}

fn descendant_prefix(dir: &str) -> String {
    if dir == "/" {
        "/".to_string()
    } else {
        format!("{dir}/")
    }
}

fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}
