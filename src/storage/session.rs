//! Session record storage: which activity the learner is playing.

use jiff::Timestamp;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use super::{Result, Storage, StorageError};

/// The persisted identity of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id: Uuid,
    pub activity_id: String,
    pub created_at: Timestamp,
}

impl SessionRecord {
    pub fn new(activity_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            activity_id: activity_id.to_string(),
            created_at: Timestamp::now(),
        }
    }
}

impl Storage {
    /// Replaces the stored session record. There is only ever one.
    pub fn save_session(&self, record: &SessionRecord) -> Result<()> {
        self.conn.execute("DELETE FROM session", [])?;
        self.conn.execute(
            "INSERT INTO session (id, activity_id, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![
                record.id.to_string(),
                &record.activity_id,
                record.created_at.to_string(),
            ],
        )?;
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<SessionRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, activity_id, created_at FROM session LIMIT 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((id_str, activity_id, created_at_str)) = row else {
            return Ok(None);
        };
        let id = id_str
            .parse::<Uuid>()
            .map_err(|e| StorageError::Corrupt(format!("invalid session id: {e}")))?;
        let created_at = created_at_str
            .parse::<Timestamp>()
            .map_err(|e| StorageError::Corrupt(format!("invalid created_at: {e}")))?;

        Ok(Some(SessionRecord {
            id,
            activity_id,
            created_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_session() {
        let storage = Storage::in_memory().unwrap();
        let record = SessionRecord::new("act-1");

        storage.save_session(&record).unwrap();

        assert_eq!(storage.load_session().unwrap(), Some(record));
    }

    #[test]
    fn saving_replaces_previous_session() {
        let storage = Storage::in_memory().unwrap();
        storage.save_session(&SessionRecord::new("act-1")).unwrap();
        storage.save_session(&SessionRecord::new("chihiro")).unwrap();

        let loaded = storage.load_session().unwrap().unwrap();
        assert_eq!(loaded.activity_id, "chihiro");
    }

    #[test]
    fn load_session_empty() {
        let storage = Storage::in_memory().unwrap();
        assert!(storage.load_session().unwrap().is_none());
    }

    #[test]
    fn corrupt_timestamp_is_reported() {
        let storage = Storage::in_memory().unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO session (id, activity_id, created_at) VALUES (?1, 'act-1', 'yesterday')",
                [Uuid::new_v4().to_string()],
            )
            .unwrap();

        let err = storage.load_session().unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
