//! SQLite storage adapter.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::{Storage, StorageResult, SCHEMA};

/// SQLite connection wrapper holding the census entries.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path)?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        let storage = Self { conn };
        storage.initialize()?;
        Ok(storage)
    }

    /// Initialize schema.
    fn initialize(&self) -> StorageResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

const UPSERT: &str = r#"
    INSERT INTO kv_store (key, value, updated_at)
    VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

impl Storage for SqliteStorage {
    fn load(&self, key: &str) -> StorageResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv_store WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    fn save(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(UPSERT, params![key, value])?;
        Ok(())
    }

    /// All entries commit in one transaction.
    fn save_batch(&mut self, entries: &[(&str, String)]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(UPSERT, params![key, value])?;
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let storage = SqliteStorage::open_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let storage = SqliteStorage::open_in_memory().unwrap();

        let tables: Vec<String> = storage
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"kv_store".to_string()));
    }

    #[test]
    fn test_upsert_overwrites() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();

        storage.save("todayPatients", "1").unwrap();
        storage.save("todayPatients", "2").unwrap();

        assert_eq!(storage.load("todayPatients").unwrap(), Some("2".into()));
        assert_eq!(storage.load("missing").unwrap(), None);
    }

    #[test]
    fn test_batch_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("census.db");

        {
            let mut storage = SqliteStorage::open(&path).unwrap();
            storage
                .save_batch(&[
                    ("patients", "[]".to_string()),
                    ("lastVisitDate", "2026-10-19".to_string()),
                ])
                .unwrap();
        }

        let reopened = SqliteStorage::open(&path).unwrap();
        assert_eq!(reopened.load("patients").unwrap(), Some("[]".into()));
        assert_eq!(
            reopened.load("lastVisitDate").unwrap(),
            Some("2026-10-19".into())
        );
    }

    #[test]
    fn test_failed_batch_leaves_earlier_keys_unchanged() {
        let mut storage = SqliteStorage::open_in_memory().unwrap();
        storage.save("patients", "[]").unwrap();
        storage
            .conn()
            .execute_batch(
                "CREATE TRIGGER reject_counter BEFORE INSERT ON kv_store
                 WHEN NEW.key = 'todayPatients'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = storage.save_batch(&[
            ("patients", r#"[{"id":1}]"#.to_string()),
            ("lastVisitDate", "2026-10-19".to_string()),
            ("todayPatients", "1".to_string()),
        ]);

        assert!(result.is_err());
        assert_eq!(storage.load("patients").unwrap(), Some("[]".into()));
        assert_eq!(storage.load("lastVisitDate").unwrap(), None);
        assert_eq!(storage.load("todayPatients").unwrap(), None);
    }
}
