//! Storage port for the census.
//!
//! The ledger only sees string key/value entries through [`Storage`], the same
//! shape the page kept in local storage. Adapters:
//!
//! - [`MemoryStorage`]: ephemeral, used by tests and throwaway sessions
//! - [`SqliteStorage`]: single-table SQLite store, file-backed or in-memory

mod memory;
mod schema;
mod sqlite;

pub use memory::*;
pub use schema::*;
pub use sqlite::*;

use thiserror::Error;

/// Serialized patient list.
pub const PATIENTS_KEY: &str = "patients";
/// Date stamp of the daily counter.
pub const LAST_VISIT_DATE_KEY: &str = "lastVisitDate";
/// Daily counter value.
pub const TODAY_PATIENTS_KEY: &str = "todayPatients";

/// Storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt entry {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key/value persistence used by the ledger.
pub trait Storage {
    /// Read an entry, `None` when absent.
    fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Overwrite an entry.
    fn save(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Overwrite several entries. Adapters that can commit atomically should.
    fn save_batch(&mut self, entries: &[(&str, String)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.save(key, value)?;
        }
        Ok(())
    }
}
