//! Snapshot storage: the whole virtual filesystem between runs.
//!
//! The tree is serialized to JSON and compressed with zstd. Repositories
//! are small but JSON byte arrays are not, so compression pays off.

use jiff::Timestamp;
use rusqlite::OptionalExtension;

use crate::vfs::Vfs;

use super::{Result, Storage};

const ZSTD_LEVEL: i32 = 3;

impl Storage {
    pub fn save_snapshot(&self, fs: &Vfs) -> Result<()> {
        let json = serde_json::to_vec(fs)?;
        let data = zstd::stream::encode_all(json.as_slice(), ZSTD_LEVEL)?;
        self.conn.execute(
            "INSERT INTO snapshot (slot, data, saved_at) VALUES (1, ?1, ?2)
             ON CONFLICT(slot) DO UPDATE SET data = excluded.data, saved_at = excluded.saved_at",
            rusqlite::params![data, Timestamp::now().to_string()],
        )?;
        Ok(())
    }

    /// The last saved filesystem, or `None` before the first save.
    pub fn load_snapshot(&self) -> Result<Option<Vfs>> {
        let data: Option<Vec<u8>> = self
            .conn
            .query_row("SELECT data FROM snapshot WHERE slot = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(data) = data else {
            return Ok(None);
        };
        let json = zstd::stream::decode_all(data.as_slice())?;
        Ok(Some(serde_json::from_slice(&json)?))
    }

    pub fn clear_snapshot(&self) -> Result<()> {
        self.conn.execute("DELETE FROM snapshot", [])?;
        Ok(())
    }
}
