//! The content-addressed engine that keeps everything inside the virtual filesystem.
//!
//! Metadata layout below `<root>/.git`:
//!
//! - `HEAD`: `ref: refs/heads/<name>` when attached, a commit id when detached.
//! - `refs/heads/<name>`: one file per branch holding its commit id. An empty
//!   file is a branch that has not been committed to yet.
//! - `packed-refs`: optional `<id> <refname>` lines for compacted refs.
//! - `objects/`: blobs, trees and commits (see [`ObjectStore`]).
//! - `index`: JSON map of staged path to blob id.
//! - `config`: INI-style remote sections.
//! - `MERGE_HEAD`, `MERGE_MSG`, `MERGE_CONFLICTS`: an unfinished merge.

use std::collections::{BTreeSet, HashSet, VecDeque};

use jiff::Timestamp;
use tracing::debug;

use crate::vfs::{FsError, Vfs};

use super::merge::{Resolution, merge_text, resolve_path};
use super::objects::{CommitBody, ObjectStore, Tree};
use super::{
    Author, Commit, CommitGraph, CommitId, GraphError, META_DIR, MergeOutcome, MergeState,
    RemoteConfig, Result, StageState, StatusRow, WorkdirState,
};

const HEADS: &str = "refs/heads/";
const REF_PREFIX: &str = "ref: ";

/// Where `HEAD` points.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Head {
    /// Full ref name, e.g. `refs/heads/main`.
    Attached(String),
    Detached(CommitId),
}

/// A [`CommitGraph`] that stores its objects and refs under `<root>/.git`.
#[derive(Debug, Clone)]
pub struct VfsGraph {
    root: String,
}

impl VfsGraph {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    fn meta_path(&self, rel: &str) -> String {
        format!("{}/{META_DIR}/{rel}", self.root)
    }

    fn objects(&self) -> ObjectStore {
        ObjectStore::new(self.meta_path("objects"))
    }

    fn read_head(&self, fs: &Vfs) -> Result<Head> {
        let raw = fs
            .read_to_string(&self.meta_path("HEAD"))
            .map_err(|_| GraphError::NotARepository(self.root.clone()))?;
        let raw = raw.trim();
        if let Some(target) = raw.strip_prefix(REF_PREFIX) {
            Ok(Head::Attached(target.trim().to_string()))
        } else if raw.is_empty() {
            Err(GraphError::Corrupt("HEAD is empty".into()))
        } else {
            Ok(Head::Detached(raw.to_string()))
        }
    }

    fn packed_refs(&self, fs: &Vfs) -> Vec<(String, CommitId)> {
        let Ok(raw) = fs.read_to_string(&self.meta_path("packed-refs")) else {
            return Vec::new();
        };
        raw.lines()
            .filter(|line| !line.starts_with('#') && !line.starts_with('^'))
            .filter_map(|line| {
                let (id, name) = line.split_once(' ')?;
                Some((name.trim().to_string(), id.trim().to_string()))
            })
            .collect()
    }

    /// Reads a full ref name. A loose file wins over `packed-refs`; an empty
    /// loose file is an unborn ref.
    fn lookup_ref(&self, fs: &Vfs, full_name: &str) -> Option<CommitId> {
        let path = self.meta_path(full_name);
        if fs.is_file(&path) {
            let id = fs.read_to_string(&path).ok()?.trim().to_string();
            return (!id.is_empty()).then_some(id);
        }
        self.packed_refs(fs)
            .into_iter()
            .find(|(name, _)| name == full_name)
            .map(|(_, id)| id)
    }

    fn head_commit(&self, fs: &Vfs) -> Result<Option<CommitId>> {
        match self.read_head(fs)? {
            Head::Attached(name) => Ok(self.lookup_ref(fs, &name)),
            Head::Detached(id) => Ok(Some(id)),
        }
    }

    fn commit_tree(&self, fs: &Vfs, id: &str) -> Result<Tree> {
        let objects = self.objects();
        let body = objects.read_commit(fs, id)?;
        objects.read_tree(fs, &body.tree)
    }

    fn head_tree(&self, fs: &Vfs) -> Result<Tree> {
        match self.head_commit(fs)? {
            Some(id) => self.commit_tree(fs, &id),
            None => Ok(Tree::new()),
        }
    }

    fn read_index(&self, fs: &Vfs) -> Result<Tree> {
        match fs.read_file(&self.meta_path("index")) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(FsError::NotFound(_)) => Ok(Tree::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_index(&self, fs: &mut Vfs, index: &Tree) -> Result<()> {
        fs.write_file(&self.meta_path("index"), serde_json::to_vec(index)?)?;
        Ok(())
    }

    fn workdir_path(&self, rel: &str) -> String {
        format!("{}/{rel}", self.root)
    }

    /// Turns a user-supplied path into one relative to the repository root.
    fn relative(&self, path: &str) -> Result<String> {
        let abs = Vfs::join(&self.root, path)?;
        if abs == self.root {
            return Ok(String::new());
        }
        let rel = abs
            .strip_prefix(&format!("{}/", self.root))
            .ok_or_else(|| GraphError::PathNotFound(path.to_string()))?;
        if rel == META_DIR || rel.starts_with(&format!("{META_DIR}/")) {
            return Err(GraphError::PathNotFound(path.to_string()));
        }
        Ok(rel.to_string())
    }

    fn workdir_blob_id(&self, fs: &Vfs, rel: &str) -> Option<String> {
        fs.read_file(&self.workdir_path(rel))
            .ok()
            .map(|content| ObjectStore::hash_blob(&content))
    }

    fn write_workdir_file(&self, fs: &mut Vfs, rel: &str, content: Vec<u8>) -> Result<()> {
        let path = self.workdir_path(rel);
        if let Some((parent, _)) = path.rsplit_once('/') {
            fs.mkdir_all(parent)?;
        }
        fs.write_file(&path, content)?;
        Ok(())
    }

    /// Removes a working-tree file and any directories it leaves empty.
    fn remove_workdir_file(&self, fs: &mut Vfs, rel: &str) -> Result<()> {
        let mut path = self.workdir_path(rel);
        if !fs.is_file(&path) {
            return Ok(());
        }
        fs.remove_file(&path)?;
        while let Some((parent, _)) = path.rsplit_once('/') {
            if parent == self.root || parent.is_empty() {
                break;
            }
            if fs.read_dir(parent).map_or(true, |children| !children.is_empty()) {
                break;
            }
            fs.remove_dir(parent)?;
            path = parent.to_string();
        }
        Ok(())
    }

    /// Moves the working tree and index from `from` to `to`, refusing to touch
    /// paths with local changes.
    fn materialize(&self, fs: &mut Vfs, from: &Tree, to: &Tree) -> Result<()> {
        let index = self.read_index(fs)?;
        let changed: Vec<&String> = from
            .keys()
            .chain(to.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|path| from.get(*path) != to.get(*path))
            .collect();

        let blocked: Vec<String> = changed
            .iter()
            .copied()
            .filter(|path| {
                let workdir = self.workdir_blob_id(fs, path);
                let staged = index.get(*path);
                let workdir_ok =
                    workdir.as_ref() == from.get(*path) || workdir.as_ref() == to.get(*path);
                let staged_ok = staged == from.get(*path) || staged == to.get(*path);
                !(workdir_ok && staged_ok)
            })
            .cloned()
            .collect();
        if !blocked.is_empty() {
            return Err(GraphError::WouldOverwrite(blocked));
        }

        let objects = self.objects();
        for path in changed {
            match to.get(path) {
                Some(id) => {
                    let content = objects.read_blob(fs, id)?;
                    self.write_workdir_file(fs, path, content)?;
                }
                None => self.remove_workdir_file(fs, path)?,
            }
        }
        self.write_index(fs, to)
    }

    /// Points whatever `HEAD` names at `id`.
    fn advance_head(&self, fs: &mut Vfs, id: &str) -> Result<()> {
        match self.read_head(fs)? {
            Head::Attached(name) => {
                let path = self.meta_path(&name);
                if let Some((parent, _)) = path.rsplit_once('/') {
                    fs.mkdir_all(parent)?;
                }
                fs.write_file(&path, format!("{id}\n"))?;
                debug!(reference = %name, commit = %id, "ref updated");
            }
            Head::Detached(_) => {
                fs.write_file(&self.meta_path("HEAD"), format!("{id}\n"))?;
                debug!(commit = %id, "detached HEAD moved");
            }
        }
        Ok(())
    }

    fn ancestors(&self, fs: &Vfs, start: &str) -> Result<HashSet<CommitId>> {
        let objects = self.objects();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start.to_string()]);
        while let Some(id) = queue.pop_front() {
            if seen.contains(&id) {
                continue;
            }
            let body = objects.read_commit(fs, &id)?;
            queue.extend(body.parents);
            seen.insert(id);
        }
        Ok(seen)
    }

    /// Nearest commit reachable from both sides, searching breadth-first from theirs.
    fn merge_base(&self, fs: &Vfs, ours: &str, theirs: &str) -> Result<Option<CommitId>> {
        let ours_ancestors = self.ancestors(fs, ours)?;
        let objects = self.objects();
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([theirs.to_string()]);
        while let Some(id) = queue.pop_front() {
            if ours_ancestors.contains(&id) {
                return Ok(Some(id));
            }
            if !seen.insert(id.clone()) {
                continue;
            }
            queue.extend(objects.read_commit(fs, &id)?.parents);
        }
        Ok(None)
    }

    /// Resolves a ref name or an abbreviated commit id.
    fn resolve_any(&self, fs: &Vfs, reference: &str) -> Result<CommitId> {
        self.resolve_ref(fs, reference)
            .or_else(|_| self.expand_id(fs, reference))
            .map_err(|_| GraphError::RefNotFound(reference.to_string()))
    }

    fn write_merge_state(&self, fs: &mut Vfs, state: &MergeState) -> Result<()> {
        fs.write_file(&self.meta_path("MERGE_HEAD"), format!("{}\n", state.theirs))?;
        fs.write_file(&self.meta_path("MERGE_MSG"), state.message.clone())?;
        fs.write_file(
            &self.meta_path("MERGE_CONFLICTS"),
            state.conflicts.join("\n"),
        )?;
        Ok(())
    }

    fn clear_merge_state(&self, fs: &mut Vfs) -> Result<()> {
        for name in ["MERGE_HEAD", "MERGE_MSG", "MERGE_CONFLICTS"] {
            match fs.remove_file(&self.meta_path(name)) {
                Ok(()) | Err(FsError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn read_config(&self, fs: &Vfs) -> Result<String> {
        match fs.read_to_string(&self.meta_path("config")) {
            Ok(raw) => Ok(raw),
            Err(FsError::NotFound(_)) => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CommitGraph for VfsGraph {
    fn init(&self, fs: &mut Vfs, default_branch: &str) -> Result<()> {
        if self.is_initialized(fs) {
            return Ok(());
        }
        fs.mkdir_all(&self.meta_path("objects"))?;
        fs.mkdir_all(&self.meta_path("refs/heads"))?;
        fs.mkdir_all(&self.meta_path("refs/tags"))?;
        fs.write_file(
            &self.meta_path("HEAD"),
            format!("{REF_PREFIX}{HEADS}{default_branch}\n"),
        )?;
        fs.write_file(&self.meta_path("config"), "[core]\n\tbare = false\n")?;
        self.write_index(fs, &Tree::new())?;
        debug!(root = %self.root, branch = default_branch, "repository initialized");
        Ok(())
    }

    fn is_initialized(&self, fs: &Vfs) -> bool {
        self.read_head(fs).is_ok()
    }

    fn add_to_index(&self, fs: &mut Vfs, path: &str) -> Result<()> {
        self.read_head(fs)?;
        let rel = self.relative(path)?;
        let abs = self.workdir_path(&rel);
        let mut index = self.read_index(fs)?;
        let mut touched = Vec::new();

        if fs.is_file(&abs) {
            let content = fs.read_file(&abs)?;
            let id = self.objects().write_blob(fs, &content)?;
            index.insert(rel.clone(), id);
            touched.push(rel);
        } else if fs.is_dir(&abs) || rel.is_empty() {
            let dir = if rel.is_empty() {
                self.root.clone()
            } else {
                abs.clone()
            };
            let prefix = if rel.is_empty() {
                String::new()
            } else {
                format!("{rel}/")
            };
            let objects = self.objects();
            for file in fs.walk_files(&dir, &[META_DIR])? {
                let file_rel = format!("{prefix}{file}");
                let content = fs.read_file(&self.workdir_path(&file_rel))?;
                index.insert(file_rel.clone(), objects.write_blob(fs, &content)?);
                touched.push(file_rel);
            }
            let removed: Vec<String> = index
                .keys()
                .filter(|p| p.starts_with(&prefix) && !fs.is_file(&self.workdir_path(p)))
                .cloned()
                .collect();
            for p in removed {
                index.remove(&p);
                touched.push(p);
            }
        } else if index.remove(&rel).is_some() {
            touched.push(rel);
        } else {
            return Err(GraphError::PathNotFound(path.to_string()));
        }

        self.write_index(fs, &index)?;
        if let Some(mut state) = self.merge_in_progress(fs)? {
            let before = state.conflicts.len();
            state.conflicts.retain(|c| !touched.contains(c));
            if state.conflicts.len() != before {
                self.write_merge_state(fs, &state)?;
            }
        }
        debug!(path, staged = touched.len(), "index updated");
        Ok(())
    }

    fn remove_from_index(&self, fs: &mut Vfs, path: &str) -> Result<()> {
        let rel = self.relative(path)?;
        let mut index = self.read_index(fs)?;
        if index.remove(&rel).is_none() {
            return Err(GraphError::PathNotFound(path.to_string()));
        }
        self.write_index(fs, &index)
    }

    fn commit(&self, fs: &mut Vfs, message: &str, author: &Author) -> Result<CommitId> {
        self.read_head(fs)?;
        let merge = self.merge_in_progress(fs)?;
        if let Some(state) = &merge {
            if !state.conflicts.is_empty() {
                return Err(GraphError::UnmergedPaths(state.conflicts.clone()));
            }
        }

        let objects = self.objects();
        let index = self.read_index(fs)?;
        let tree = objects.write_tree(fs, &index)?;
        let mut parents: Vec<CommitId> = self.head_commit(fs)?.into_iter().collect();
        if let Some(state) = merge {
            parents.push(state.theirs);
        }
        let body = CommitBody {
            tree,
            parents,
            author: author.clone(),
            message: message.to_string(),
            timestamp: Timestamp::now(),
        };
        let id = objects.write_commit(fs, &body)?;
        self.advance_head(fs, &id)?;
        self.clear_merge_state(fs)?;
        debug!(commit = %id, parents = body.parents.len(), "commit recorded");
        Ok(id)
    }

    fn log(&self, fs: &Vfs, reference: &str) -> Result<Vec<Commit>> {
        let start = self.resolve_ref(fs, reference)?;
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([start]);
        let mut commits = Vec::new();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id.clone()) {
                continue;
            }
            let commit = self.read_commit(fs, &id)?;
            queue.extend(commit.parent_ids.iter().cloned());
            commits.push(commit);
        }
        commits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(commits)
    }

    fn resolve_ref(&self, fs: &Vfs, reference: &str) -> Result<CommitId> {
        self.read_head(fs)?;
        let not_found = || GraphError::RefNotFound(reference.to_string());
        if reference == "HEAD" {
            return self.head_commit(fs)?.ok_or_else(not_found);
        }
        if reference.starts_with("refs/") {
            return self.lookup_ref(fs, reference).ok_or_else(not_found);
        }
        for prefix in [HEADS, "refs/tags/", "refs/remotes/"] {
            if let Some(id) = self.lookup_ref(fs, &format!("{prefix}{reference}")) {
                return Ok(id);
            }
        }
        if reference.len() == 40 && self.objects().is_commit(fs, reference) {
            return Ok(reference.to_string());
        }
        Err(not_found())
    }

    fn expand_id(&self, fs: &Vfs, prefix: &str) -> Result<CommitId> {
        if prefix.len() < 4 || !prefix.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GraphError::RefNotFound(prefix.to_string()));
        }
        let objects = self.objects();
        let mut matches: Vec<String> = objects
            .find_prefix(fs, &prefix.to_ascii_lowercase())
            .into_iter()
            .filter(|id| objects.is_commit(fs, id))
            .collect();
        match matches.len() {
            0 => Err(GraphError::RefNotFound(prefix.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(GraphError::AmbiguousId(prefix.to_string())),
        }
    }

    fn read_commit(&self, fs: &Vfs, id: &str) -> Result<Commit> {
        let body = self.objects().read_commit(fs, id)?;
        Ok(Commit {
            id: id.to_string(),
            message: body.message,
            author: body.author,
            parent_ids: body.parents,
            tree: body.tree,
            timestamp: body.timestamp,
        })
    }

    fn list_branches(&self, fs: &Vfs) -> Result<Vec<String>> {
        self.read_head(fs)?;
        let heads = self.meta_path("refs/heads");
        let mut names = BTreeSet::new();
        if fs.is_dir(&heads) {
            for name in fs.walk_files(&heads, &[])? {
                if self.lookup_ref(fs, &format!("{HEADS}{name}")).is_some() {
                    names.insert(name);
                }
            }
        }
        for (name, _) in self.packed_refs(fs) {
            if let Some(branch) = name.strip_prefix(HEADS) {
                names.insert(branch.to_string());
            }
        }
        Ok(names.into_iter().collect())
    }

    fn current_branch(&self, fs: &Vfs) -> Result<Option<String>> {
        Ok(match self.read_head(fs)? {
            Head::Attached(name) => name.strip_prefix(HEADS).map(str::to_string),
            Head::Detached(_) => None,
        })
    }

    fn checkout(&self, fs: &mut Vfs, reference: &str) -> Result<()> {
        if let Some(state) = self.merge_in_progress(fs)? {
            if !state.conflicts.is_empty() {
                return Err(GraphError::UnmergedPaths(state.conflicts));
            }
        }
        let branch_ref = format!("{HEADS}{reference}");
        let (target, head) = match self.lookup_ref(fs, &branch_ref) {
            Some(id) => (id, format!("{REF_PREFIX}{branch_ref}\n")),
            None => {
                let id = self.resolve_any(fs, reference)?;
                let head = format!("{id}\n");
                (id, head)
            }
        };

        let from = self.head_tree(fs)?;
        let to = self.commit_tree(fs, &target)?;
        self.materialize(fs, &from, &to)?;
        fs.write_file(&self.meta_path("HEAD"), head)?;
        self.clear_merge_state(fs)?;
        debug!(reference, commit = %target, "checked out");
        Ok(())
    }

    fn merge(&self, fs: &mut Vfs, theirs: &str, author: &Author) -> Result<MergeOutcome> {
        if let Some(state) = self.merge_in_progress(fs)? {
            return Err(GraphError::UnmergedPaths(state.conflicts));
        }
        let their_id = self.resolve_any(fs, theirs)?;
        let Some(our_id) = self.head_commit(fs)? else {
            let to = self.commit_tree(fs, &their_id)?;
            self.materialize(fs, &Tree::new(), &to)?;
            self.advance_head(fs, &their_id)?;
            return Ok(MergeOutcome::FastForward { to: their_id });
        };
        if our_id == their_id {
            return Ok(MergeOutcome::FastForward { to: their_id });
        }
        if self.ancestors(fs, &our_id)?.contains(&their_id) {
            return Ok(MergeOutcome::AlreadyUpToDate);
        }

        let our_tree = self.commit_tree(fs, &our_id)?;
        if self.ancestors(fs, &their_id)?.contains(&our_id) {
            let to = self.commit_tree(fs, &their_id)?;
            self.materialize(fs, &our_tree, &to)?;
            self.advance_head(fs, &their_id)?;
            debug!(to = %their_id, "fast-forward merge");
            return Ok(MergeOutcome::FastForward { to: their_id });
        }

        let Some(base_id) = self.merge_base(fs, &our_id, &their_id)? else {
            return Err(GraphError::MergeUnsupported(
                "refusing to merge unrelated histories".into(),
            ));
        };
        let base_tree = self.commit_tree(fs, &base_id)?;
        let their_tree = self.commit_tree(fs, &their_id)?;

        let objects = self.objects();
        let mut result = Tree::new();
        let mut conflicted: Vec<(String, String)> = Vec::new();
        let paths: BTreeSet<&String> = base_tree
            .keys()
            .chain(our_tree.keys())
            .chain(their_tree.keys())
            .collect();
        for path in paths {
            let base = base_tree.get(path).map(String::as_str);
            let ours = our_tree.get(path).map(String::as_str);
            let theirs_blob = their_tree.get(path).map(String::as_str);
            match resolve_path(base, ours, theirs_blob) {
                Resolution::Ours(id) | Resolution::Theirs(id) => {
                    if let Some(id) = id {
                        result.insert(path.clone(), id);
                    }
                }
                Resolution::ModifyDelete => {
                    return Err(GraphError::MergeUnsupported(format!(
                        "'{path}' was modified on one side and deleted on the other"
                    )));
                }
                Resolution::Content => {
                    let read = |id: Option<&str>| -> Result<String> {
                        match id {
                            Some(id) => Ok(String::from_utf8_lossy(&objects.read_blob(fs, id)?)
                                .into_owned()),
                            None => Ok(String::new()),
                        }
                    };
                    let merged = merge_text(&read(base)?, &read(ours)?, &read(theirs_blob)?, theirs);
                    if merged.conflicted {
                        // The index keeps our side until the path is re-added.
                        if let Some(id) = ours {
                            result.insert(path.clone(), id.to_string());
                        }
                        conflicted.push((path.clone(), merged.text));
                    } else {
                        result.insert(path.clone(), objects.write_blob(fs, merged.text.as_bytes())?);
                    }
                }
            }
        }

        let into = self
            .current_branch(fs)?
            .unwrap_or_else(|| "HEAD".to_string());
        let message = format!("Merge branch '{theirs}' into {into}");
        let dirty: Vec<String> = conflicted
            .iter()
            .filter(|(path, _)| self.workdir_blob_id(fs, path).as_ref() != our_tree.get(path))
            .map(|(path, _)| path.clone())
            .collect();
        if !dirty.is_empty() {
            return Err(GraphError::WouldOverwrite(dirty));
        }
        self.materialize(fs, &our_tree, &result)?;
        let state = MergeState {
            theirs: their_id,
            message,
            conflicts: conflicted.iter().map(|(p, _)| p.clone()).collect(),
        };
        self.write_merge_state(fs, &state)?;

        if !conflicted.is_empty() {
            for (path, text) in conflicted {
                self.write_workdir_file(fs, &path, text.into_bytes())?;
            }
            debug!(conflicts = state.conflicts.len(), "merge stopped on conflicts");
            return Err(GraphError::MergeConflict {
                paths: state.conflicts,
            });
        }
        let id = self.commit(fs, &state.message, author)?;
        Ok(MergeOutcome::MergeCommit { id })
    }

    fn merge_in_progress(&self, fs: &Vfs) -> Result<Option<MergeState>> {
        let Ok(theirs) = fs.read_to_string(&self.meta_path("MERGE_HEAD")) else {
            return Ok(None);
        };
        let message = fs
            .read_to_string(&self.meta_path("MERGE_MSG"))
            .unwrap_or_default();
        let conflicts = fs
            .read_to_string(&self.meta_path("MERGE_CONFLICTS"))
            .unwrap_or_default()
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();
        Ok(Some(MergeState {
            theirs: theirs.trim().to_string(),
            message,
            conflicts,
        }))
    }

    fn status_matrix(&self, fs: &Vfs) -> Result<Vec<StatusRow>> {
        let head = self.head_tree(fs)?;
        let index = self.read_index(fs)?;
        let workdir = fs.walk_files(&self.root, &[META_DIR])?;

        let paths: BTreeSet<&String> = head.keys().chain(index.keys()).chain(workdir.iter()).collect();
        let rows = paths
            .into_iter()
            .map(|path| {
                let in_head = head.get(path);
                let on_disk = self.workdir_blob_id(fs, path);
                let workdir = match &on_disk {
                    None => WorkdirState::Absent,
                    Some(id) if Some(id) == in_head => WorkdirState::Unchanged,
                    Some(_) => WorkdirState::Modified,
                };
                let stage = match index.get(path) {
                    None => StageState::Absent,
                    Some(id) if Some(id) == in_head => StageState::MatchesHead,
                    Some(id) if Some(id) == on_disk.as_ref() => StageState::MatchesWorkdir,
                    Some(_) => StageState::Diverged,
                };
                StatusRow {
                    path: path.clone(),
                    in_head: in_head.is_some(),
                    workdir,
                    stage,
                }
            })
            .collect();
        Ok(rows)
    }

    fn list_files(&self, fs: &Vfs, reference: &str) -> Result<Vec<String>> {
        let id = self.resolve_any(fs, reference)?;
        Ok(self.commit_tree(fs, &id)?.into_keys().collect())
    }

    fn add_remote(&self, fs: &mut Vfs, name: &str, url: &str) -> Result<()> {
        if self.list_remotes(fs)?.iter().any(|r| r.name == name) {
            return Err(GraphError::RemoteExists(name.to_string()));
        }
        let mut config = self.read_config(fs)?;
        if !config.is_empty() && !config.ends_with('\n') {
            config.push('\n');
        }
        config.push_str(&format!(
            "[remote \"{name}\"]\n\turl = {url}\n\tfetch = +refs/heads/*:refs/remotes/{name}/*\n"
        ));
        fs.write_file(&self.meta_path("config"), config)?;
        debug!(remote = name, url, "remote added");
        Ok(())
    }

    fn delete_remote(&self, fs: &mut Vfs, name: &str) -> Result<()> {
        let config = self.read_config(fs)?;
        let header = format!("[remote \"{name}\"]");
        let mut kept = String::new();
        let mut skipping = false;
        let mut found = false;
        for line in config.lines() {
            if line.starts_with('[') {
                skipping = line.trim() == header;
                found |= skipping;
            }
            if !skipping {
                kept.push_str(line);
                kept.push('\n');
            }
        }
        if !found {
            return Err(GraphError::RemoteNotFound(name.to_string()));
        }
        fs.write_file(&self.meta_path("config"), kept)?;
        let tracking = self.meta_path(&format!("refs/remotes/{name}"));
        if fs.is_dir(&tracking) {
            fs.remove_dir_all(&tracking)?;
        }
        debug!(remote = name, "remote removed");
        Ok(())
    }

    fn list_remotes(&self, fs: &Vfs) -> Result<Vec<RemoteConfig>> {
        let config = self.read_config(fs)?;
        let mut remotes = Vec::new();
        let mut current: Option<String> = None;
        for line in config.lines().map(str::trim) {
            if line.starts_with('[') {
                current = line
                    .strip_prefix("[remote \"")
                    .and_then(|rest| rest.strip_suffix("\"]"))
                    .map(str::to_string);
                continue;
            }
            let Some(name) = &current else { continue };
            if let Some((key, value)) = line.split_once('=') {
                if key.trim() == "url" {
                    remotes.push(RemoteConfig {
                        name: name.clone(),
                        url: value.trim().to_string(),
                    });
                }
            }
        }
        remotes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(remotes)
    }
}
