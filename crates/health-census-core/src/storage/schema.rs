//! SQLite schema definition.

/// Schema for the key/value store backing [`super::SqliteStorage`].
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Key/value entries (patients, lastVisitDate, todayPatients)
-- ============================================================================

CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
