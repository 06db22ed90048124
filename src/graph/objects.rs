//! Content-addressed object store.
//!
//! Objects live under `<meta>/objects/<first two hex chars>/<rest>`, each file
//! holding `<kind> <len>\0<payload>`. The id is the SHA-256 digest of those
//! bytes, hex-encoded and cut to 40 characters. Objects are immutable: writing
//! an id that already exists is a no-op.

use std::collections::BTreeMap;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::vfs::Vfs;

use super::{Author, GraphError, Result};

const ID_LEN: usize = 40;

/// A flat tree: repository-relative path to blob id.
pub(super) type Tree = BTreeMap<String, String>;

/// Commit payload as stored on disk (the id is derived, not stored).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CommitBody {
    pub tree: String,
    pub parents: Vec<String>,
    pub author: Author,
    pub message: String,
    pub timestamp: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Blob,
    Tree,
    Commit,
}

impl Kind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "blob" => Some(Self::Blob),
            "tree" => Some(Self::Tree),
            "commit" => Some(Self::Commit),
            _ => None,
        }
    }
}

/// Reads and writes objects below a fixed `objects` directory.
pub(super) struct ObjectStore {
    dir: String,
}

impl ObjectStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: dir.into() }
    }

    /// The id a blob with this content has, without writing it.
    pub fn hash_blob(content: &[u8]) -> String {
        hash(&encode(Kind::Blob, content))
    }

    pub fn write_blob(&self, fs: &mut Vfs, content: &[u8]) -> Result<String> {
        self.write(fs, Kind::Blob, content)
    }

    pub fn write_tree(&self, fs: &mut Vfs, tree: &Tree) -> Result<String> {
        let payload = serde_json::to_vec(tree)?;
        self.write(fs, Kind::Tree, &payload)
    }

    pub fn write_commit(&self, fs: &mut Vfs, body: &CommitBody) -> Result<String> {
        let payload = serde_json::to_vec(body)?;
        self.write(fs, Kind::Commit, &payload)
    }

    pub fn read_blob(&self, fs: &Vfs, id: &str) -> Result<Vec<u8>> {
        self.read(fs, id, Kind::Blob)
    }

    pub fn read_tree(&self, fs: &Vfs, id: &str) -> Result<Tree> {
        let payload = self.read(fs, id, Kind::Tree)?;
        Ok(serde_json::from_slice(&payload)?)
    }

    pub fn read_commit(&self, fs: &Vfs, id: &str) -> Result<CommitBody> {
        let payload = self.read(fs, id, Kind::Commit)?;
        Ok(serde_json::from_slice(&payload)?)
    }

    pub fn is_commit(&self, fs: &Vfs, id: &str) -> bool {
        self.read(fs, id, Kind::Commit).is_ok()
    }

    /// All stored ids starting with `prefix`.
    pub fn find_prefix(&self, fs: &Vfs, prefix: &str) -> Vec<String> {
        if prefix.len() < 2 {
            return Vec::new();
        }
        let (fan, rest) = prefix.split_at(2);
        let Ok(names) = fs.read_dir(&format!("{}/{fan}", self.dir)) else {
            return Vec::new();
        };
        names
            .into_iter()
            .filter(|name| name.starts_with(rest))
            .map(|name| format!("{fan}{name}"))
            .collect()
    }

    fn write(&self, fs: &mut Vfs, kind: Kind, payload: &[u8]) -> Result<String> {
        let bytes = encode(kind, payload);
        let id = hash(&bytes);
        let path = self.path_of(&id);
        if fs.is_file(&path) {
            return Ok(id);
        }
        fs.mkdir_all(&format!("{}/{}", self.dir, &id[..2]))?;
        fs.write_file(&path, bytes)?;
        Ok(id)
    }

    fn read(&self, fs: &Vfs, id: &str, expected: Kind) -> Result<Vec<u8>> {
        if id.len() != ID_LEN || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(GraphError::ObjectNotFound(id.to_string()));
        }
        let bytes = fs
            .read_file(&self.path_of(id))
            .map_err(|_| GraphError::ObjectNotFound(id.to_string()))?;
        let nul = bytes
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| GraphError::Corrupt(format!("object {id} has no header")))?;
        let header = std::str::from_utf8(&bytes[..nul])
            .map_err(|_| GraphError::Corrupt(format!("object {id} has a bad header")))?;
        let kind = header
            .split(' ')
            .next()
            .and_then(Kind::parse)
            .ok_or_else(|| GraphError::Corrupt(format!("object {id} has an unknown kind")))?;
        if kind != expected {
            return Err(GraphError::ObjectNotFound(format!(
                "{id} is a {}, not a {}",
                kind.as_str(),
                expected.as_str()
            )));
        }
        Ok(bytes[nul + 1..].to_vec())
    }

    fn path_of(&self, id: &str) -> String {
        format!("{}/{}/{}", self.dir, &id[..2], &id[2..])
    }
}

fn encode(kind: Kind, payload: &[u8]) -> Vec<u8> {
    let mut bytes = format!("{} {}\0", kind.as_str(), payload.len()).into_bytes();
    bytes.extend_from_slice(payload);
    bytes
}

fn hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut id = hex::encode(digest);
    id.truncate(ID_LEN);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Vfs, ObjectStore) {
        let mut fs = Vfs::new();
        fs.mkdir_all("/repo/.git/objects").unwrap();
        (fs, ObjectStore::new("/repo/.git/objects"))
    }

    #[test]
    fn blob_ids_are_content_addressed() {
        let (mut fs, store) = store();
        let a = store.write_blob(&mut fs, b"hello").unwrap();
        let b = store.write_blob(&mut fs, b"hello").unwrap();
        let c = store.write_blob(&mut fs, b"world").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 40);
        assert_eq!(a, ObjectStore::hash_blob(b"hello"));
        assert_eq!(store.read_blob(&fs, &a).unwrap(), b"hello");
    }

    #[test]
    fn reading_with_wrong_kind_fails() {
        let (mut fs, store) = store();
        let id = store.write_blob(&mut fs, b"x").unwrap();
        assert!(matches!(
            store.read_tree(&fs, &id),
            Err(GraphError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn find_prefix_matches_stored_ids() {
        let (mut fs, store) = store();
        let id = store.write_blob(&mut fs, b"content").unwrap();

        assert_eq!(store.find_prefix(&fs, &id[..7]), vec![id.clone()]);
        assert!(store.find_prefix(&fs, "zz").is_empty());
    }
}
