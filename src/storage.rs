//! Local persistence for the learner's session.
//!
//! Everything lives in one `SQLite` database under the state root:
//!
//! ```text
//! <root>/session.sqlite
//!   session    # the session record (id, activity, created_at)
//!   remote     # the simulated remote, as JSON
//!   snapshot   # the virtual filesystem, as zstd-compressed JSON
//!   hints      # command keys whose hint was already shown
//! ```
//!
//! The remote lives in its own table so resetting the repository snapshot
//! leaves it in place.

mod hints;
mod remote;
mod session;
mod snapshot;

use std::{fs, io, path::Path, path::PathBuf};

use rusqlite::Connection;

pub use session::SessionRecord;

/// File name of the session database inside the state root.
pub const DB_FILE: &str = "session.sqlite";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS session (
        id          TEXT PRIMARY KEY,
        activity_id TEXT NOT NULL,
        created_at  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS remote (
        slot   INTEGER PRIMARY KEY CHECK (slot = 1),
        record TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS snapshot (
        slot     INTEGER PRIMARY KEY CHECK (slot = 1),
        data     BLOB NOT NULL,
        saved_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS hints (
        key TEXT PRIMARY KEY
    );
";

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupt session data: {0}")]
    Corrupt(String),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// SQLite-backed storage for one learner session.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the session database inside `root`.
    ///
    /// The directory is created if it doesn't exist.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root)?;
        let conn = Connection::open(root.join(DB_FILE))?;
        Self::with_connection(conn)
    }

    /// A throwaway database, for tests and one-off runs.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    /// Returns the default state root: `~/.git-trainer/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".git-trainer"))
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Forgets everything: session, remote, snapshot and hints.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM session", [])?;
        self.delete_remote()?;
        self.clear_snapshot()?;
        self.clear_hints()
    }
}
