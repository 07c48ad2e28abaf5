use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

use crate::error::StorageError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cached_status (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    client_id TEXT NOT NULL,
    payload BLOB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_cached_status_client ON cached_status (client_id);
CREATE TABLE IF NOT EXISTS key_value (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Shared handle to the cache database.
///
/// All access goes through one connection; callers lock it for the whole
/// duration of a call so physical access is serialized across feeds.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file inside `db_dir`
    pub fn open<P: AsRef<Path>>(db_dir: P) -> Result<Self, StorageError> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir)?;

        let conn = Connection::open(db_dir.join(crate::constants::CACHE_DB_FILE))?;
        Self::with_connection(conn)
    }

    /// Private in-memory database, used in tests and when no data dir is usable
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn conn(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_database_creation() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();

        let conn = db.conn();
        let conn = conn.lock();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM cached_status", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
        assert!(dir.path().join(crate::constants::CACHE_DB_FILE).exists());
    }

    #[test]
    fn test_open_is_idempotent() {
        let dir = tempdir().unwrap();
        Database::open(dir.path()).unwrap();
        Database::open(dir.path()).unwrap();
    }
}
