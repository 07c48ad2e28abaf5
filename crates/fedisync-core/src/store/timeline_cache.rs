//! Bounded per-session cache of the most recent feed items.
//!
//! The cache is a cold-start accelerator only. Each write replaces the whole
//! generation for a session (delete then insert, in one transaction) instead
//! of patching it, so the stored window can lag one fetch behind the live
//! list. Storage failures are logged and turned into misses; nothing here
//! returns an error to the caller.

use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Database;
use crate::constants::{LAST_SEEN_KEY_PREFIX, MAX_CACHE_ITEMS};
use crate::error::StorageError;

/// One stored item, still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord {
    pub session_key: String,
    pub payload: Vec<u8>,
    /// Row id; grows with insertion
    pub inserted_order: i64,
}

impl CacheRecord {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[derive(Clone)]
pub struct TimelineCache {
    db: Database,
    max_items: usize,
}

impl TimelineCache {
    pub fn new(db: Database) -> Self {
        Self::with_max_items(db, MAX_CACHE_ITEMS)
    }

    pub fn with_max_items(db: Database, max_items: usize) -> Self {
        Self { db, max_items }
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Replace the cached generation for `session_key` with the first
    /// `max_items` of `items`, keeping the caller's order.
    ///
    /// An empty slice leaves the previous generation in place.
    pub fn write<T: Serialize>(&self, session_key: &str, items: &[T]) {
        if items.is_empty() {
            return;
        }
        let items = &items[..items.len().min(self.max_items)];

        match self.try_write(session_key, items) {
            Ok(()) => {
                tracing::debug!(session_key, count = items.len(), "timeline_cache: saved");
            }
            Err(e) => {
                tracing::warn!(session_key, error = %e, "timeline_cache: failed to save items");
            }
        }
    }

    fn try_write<T: Serialize>(&self, session_key: &str, items: &[T]) -> Result<(), StorageError> {
        // Encode everything before touching the table so a bad item cannot
        // leave the session half-written.
        let payloads = items
            .iter()
            .map(serde_json::to_vec)
            .collect::<Result<Vec<_>, _>>()?;

        let conn = self.db.conn();
        let mut conn = conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM cached_status WHERE client_id = ?1",
            params![session_key],
        )?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO cached_status (client_id, payload) VALUES (?1, ?2)")?;
            for payload in &payloads {
                stmt.execute(params![session_key, payload])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Stored records for `session_key`, ordered by session key.
    ///
    /// This order says nothing about feed chronology; sort before display.
    pub fn read(&self, session_key: &str) -> Vec<CacheRecord> {
        match self.try_read(session_key) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(session_key, error = %e, "timeline_cache: failed to read items");
                Vec::new()
            }
        }
    }

    fn try_read(&self, session_key: &str) -> Result<Vec<CacheRecord>, StorageError> {
        let conn = self.db.conn();
        let conn = conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, client_id, payload FROM cached_status
             WHERE client_id = ?1 ORDER BY client_id ASC, id ASC",
        )?;
        let records = stmt
            .query_map(params![session_key], |row| {
                Ok(CacheRecord {
                    inserted_order: row.get(0)?,
                    session_key: row.get(1)?,
                    payload: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Decoded items for `session_key`. Records that no longer decode (e.g.
    /// written by an older model) are skipped.
    pub fn read_items<T: DeserializeOwned>(&self, session_key: &str) -> Vec<T> {
        self.read(session_key)
            .iter()
            .filter_map(|record| match record.decode::<T>() {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(
                        session_key,
                        row = record.inserted_order,
                        error = %e,
                        "timeline_cache: dropping undecodable record"
                    );
                    None
                }
            })
            .collect()
    }

    pub fn count(&self, session_key: &str) -> usize {
        let conn = self.db.conn();
        let conn = conn.lock();
        let result: Result<i64, _> = conn.query_row(
            "SELECT COUNT(*) FROM cached_status WHERE client_id = ?1",
            params![session_key],
            |row| row.get(0),
        );
        match result {
            Ok(count) => count.max(0) as usize,
            Err(e) => {
                tracing::warn!(session_key, error = %e, "timeline_cache: failed to count items");
                0
            }
        }
    }

    pub fn clear(&self, session_key: &str) {
        let conn = self.db.conn();
        let conn = conn.lock();
        if let Err(e) = conn.execute(
            "DELETE FROM cached_status WHERE client_id = ?1",
            params![session_key],
        ) {
            tracing::warn!(session_key, error = %e, "timeline_cache: failed to clear items");
        }
    }

    pub fn set_last_seen(&self, session_key: &str, ids: &[String]) {
        if let Err(e) = self.try_set_last_seen(session_key, ids) {
            tracing::warn!(session_key, error = %e, "timeline_cache: failed to save last seen ids");
        }
    }

    fn try_set_last_seen(&self, session_key: &str, ids: &[String]) -> Result<(), StorageError> {
        let value = serde_json::to_string(ids)?;
        let conn = self.db.conn();
        let conn = conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO key_value (key, value) VALUES (?1, ?2)",
            params![last_seen_key(session_key), value],
        )?;
        Ok(())
    }

    pub fn get_last_seen(&self, session_key: &str) -> Option<Vec<String>> {
        match self.try_get_last_seen(session_key) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(session_key, error = %e, "timeline_cache: failed to read last seen ids");
                None
            }
        }
    }

    fn try_get_last_seen(&self, session_key: &str) -> Result<Option<Vec<String>>, StorageError> {
        let conn = self.db.conn();
        let conn = conn.lock();
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM key_value WHERE key = ?1",
                params![last_seen_key(session_key)],
                |row| row.get(0),
            )
            .optional()?;
        match value {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }
}

fn last_seen_key(session_key: &str) -> String {
    format!("{}{}", LAST_SEEN_KEY_PREFIX, session_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::statuses;
    use crate::models::Status;
    use tempfile::tempdir;

    fn cache() -> TimelineCache {
        TimelineCache::new(Database::in_memory().unwrap())
    }

    fn ids(items: &[Status]) -> Vec<String> {
        items.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_write_then_read_keeps_caller_order() {
        let cache = cache();
        let items = statuses("s", 5);
        cache.write("alice@example.social", &items);

        let read: Vec<Status> = cache.read_items("alice@example.social");
        assert_eq!(ids(&read), ids(&items));
        assert_eq!(cache.count("alice@example.social"), 5);
    }

    #[test]
    fn test_write_is_bounded_to_most_recent_items() {
        let cache = cache();
        let items = statuses("s", 450);
        cache.write("session", &items);

        assert_eq!(cache.count("session"), MAX_CACHE_ITEMS);
        let read: Vec<Status> = cache.read_items("session");
        assert_eq!(ids(&read), ids(&items[..MAX_CACHE_ITEMS]));
    }

    #[test]
    fn test_write_replaces_previous_generation() {
        let cache = cache();
        cache.write("session", &statuses("old", 10));
        cache.write("session", &statuses("new", 3));

        let read: Vec<Status> = cache.read_items("session");
        assert_eq!(read.len(), 3);
        assert!(read.iter().all(|s| s.id.starts_with("new")));
    }

    #[test]
    fn test_empty_write_keeps_previous_generation() {
        let cache = cache();
        cache.write("session", &statuses("s", 4));
        cache.write::<Status>("session", &[]);

        assert_eq!(cache.count("session"), 4);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let cache = cache();
        cache.write("a", &statuses("a", 2));
        cache.write("b", &statuses("b", 7));
        cache.clear("a");

        assert_eq!(cache.count("a"), 0);
        assert_eq!(cache.count("b"), 7);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let cache = cache();
        cache.write("session", &statuses("s", 3));
        cache.clear("session");
        cache.clear("session");

        assert_eq!(cache.count("session"), 0);
        assert!(cache.read("session").is_empty());
    }

    #[test]
    fn test_read_records_are_ordered_by_insertion_within_session() {
        let cache = cache();
        cache.write("session", &statuses("s", 3));

        let records = cache.read("session");
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.session_key == "session"));
        assert!(records
            .windows(2)
            .all(|w| w[0].inserted_order < w[1].inserted_order));
    }

    #[test]
    fn test_undecodable_record_is_skipped() {
        let db = Database::in_memory().unwrap();
        let cache = TimelineCache::new(db.clone());
        cache.write("session", &statuses("s", 2));
        db.conn()
            .lock()
            .execute(
                "INSERT INTO cached_status (client_id, payload) VALUES ('session', x'00ff')",
                [],
            )
            .unwrap();

        assert_eq!(cache.count("session"), 3);
        let read: Vec<Status> = cache.read_items("session");
        assert_eq!(read.len(), 2);
    }

    #[test]
    fn test_custom_bound() {
        let cache = TimelineCache::with_max_items(Database::in_memory().unwrap(), 10);
        cache.write("session", &statuses("s", 25));
        assert_eq!(cache.count("session"), 10);
    }

    #[test]
    fn test_last_seen_is_overwritten_wholesale() {
        let cache = cache();
        assert_eq!(cache.get_last_seen("session"), None);

        cache.set_last_seen("session", &["3".to_string(), "2".to_string()]);
        cache.set_last_seen("session", &["9".to_string()]);

        assert_eq!(cache.get_last_seen("session"), Some(vec!["9".to_string()]));
        assert_eq!(cache.get_last_seen("other"), None);
    }

    #[test]
    fn test_last_seen_survives_item_clear() {
        let cache = cache();
        cache.write("session", &statuses("s", 2));
        cache.set_last_seen("session", &["s0".to_string()]);
        cache.clear("session");

        assert_eq!(cache.get_last_seen("session"), Some(vec!["s0".to_string()]));
    }

    #[test]
    fn test_cache_persists_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let cache = TimelineCache::new(Database::open(dir.path()).unwrap());
            cache.write("session", &statuses("s", 6));
            cache.set_last_seen("session", &["s1".to_string()]);
        }

        let cache = TimelineCache::new(Database::open(dir.path()).unwrap());
        assert_eq!(cache.count("session"), 6);
        assert_eq!(cache.get_last_seen("session"), Some(vec!["s1".to_string()]));
    }
}
