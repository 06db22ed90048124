//! Simulated remote storage: a single JSON record, absent until created.

use rusqlite::OptionalExtension;

use crate::model::RemoteRepository;

use super::{Result, Storage};

impl Storage {
    pub fn save_remote(&self, remote: &RemoteRepository) -> Result<()> {
        let json = serde_json::to_string(remote)?;
        self.conn.execute(
            "INSERT INTO remote (slot, record) VALUES (1, ?1)
             ON CONFLICT(slot) DO UPDATE SET record = excluded.record",
            [json],
        )?;
        Ok(())
    }

    /// The stored remote, or `None` when none was ever created.
    pub fn load_remote(&self) -> Result<Option<RemoteRepository>> {
        let json: Option<String> = self
            .conn
            .query_row("SELECT record FROM remote WHERE slot = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        json.map(|j| serde_json::from_str(&j).map_err(Into::into))
            .transpose()
    }

    pub fn delete_remote(&self) -> Result<()> {
        self.conn.execute("DELETE FROM remote", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::model::{PrStatus, PullRequest};

    #[test]
    fn save_and_load_remote() {
        let storage = Storage::in_memory().unwrap();
        let mut remote = RemoteRepository::new("website");
        remote.pull_requests.push(PullRequest {
            id: 1,
            from_branch: "feature/login".into(),
            to_branch: "main".into(),
            title: "Login".into(),
            status: PrStatus::Open,
            created_at: Timestamp::now(),
            merged_at: None,
        });

        storage.save_remote(&remote).unwrap();

        assert_eq!(storage.load_remote().unwrap(), Some(remote));
    }

    #[test]
    fn saving_overwrites_the_single_record() {
        let storage = Storage::in_memory().unwrap();
        storage.save_remote(&RemoteRepository::new("one")).unwrap();
        storage.save_remote(&RemoteRepository::new("two")).unwrap();

        assert_eq!(storage.load_remote().unwrap().unwrap().name, "two");
    }

    #[test]
    fn delete_remote_is_idempotent() {
        let storage = Storage::in_memory().unwrap();
        storage.delete_remote().unwrap();
        storage.save_remote(&RemoteRepository::new("one")).unwrap();
        storage.delete_remote().unwrap();

        assert!(storage.load_remote().unwrap().is_none());
    }
}
