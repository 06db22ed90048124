//! Hint bookkeeping: which command keys already got their one-time hint.

use std::collections::BTreeSet;

use super::{Result, Storage};

impl Storage {
    pub fn shown_hints(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM hints")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?;
        Ok(keys)
    }

    /// Idempotent: marking a key twice keeps one row.
    pub fn mark_hint_shown(&self, key: &str) -> Result<()> {
        self.conn
            .execute("INSERT OR IGNORE INTO hints (key) VALUES (?1)", [key])?;
        Ok(())
    }

    pub fn clear_hints(&self) -> Result<()> {
        self.conn.execute("DELETE FROM hints", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_list_hints() {
        let storage = Storage::in_memory().unwrap();
        storage.mark_hint_shown("git init").unwrap();
        storage.mark_hint_shown("git commit").unwrap();
        storage.mark_hint_shown("git init").unwrap();

        let keys: Vec<_> = storage.shown_hints().unwrap().into_iter().collect();
        assert_eq!(keys, ["git commit", "git init"]);
    }

    #[test]
    fn clear_hints_forgets_everything() {
        let storage = Storage::in_memory().unwrap();
        storage.mark_hint_shown("git status").unwrap();

        storage.clear_hints().unwrap();

        assert!(storage.shown_hints().unwrap().is_empty());
    }
}
