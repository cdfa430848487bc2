// SPDX-FileCopyrightText: 2026 Tessera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent cache store on SQLite.
//!
//! Entries live in a single `definition_cache` table keyed by cache key. The
//! connection is opened in WAL mode so several processes can share one file.
//! All access goes through one connection guarded by a mutex.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tessera_core::{CacheError, CacheStore};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS definition_cache (
    key        TEXT PRIMARY KEY NOT NULL,
    value      BLOB NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// SQLite-backed cache store.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(CacheError::backend)?;
        }
        let conn = Connection::open(path).map_err(CacheError::backend)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
            .map_err(CacheError::backend)?;
        let store = Self::with_connection(conn)?;
        debug!(path = %path.display(), "SQLite cache store opened");
        Ok(store)
    }

    /// In-memory database, mostly useful for tests.
    pub fn open_in_memory() -> Result<Self, CacheError> {
        Self::with_connection(Connection::open_in_memory().map_err(CacheError::backend)?)
    }

    fn with_connection(conn: Connection) -> Result<Self, CacheError> {
        conn.execute_batch(SCHEMA).map_err(CacheError::backend)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
        self.conn
            .lock()
            .map_err(|_| CacheError::backend("cache connection lock poisoned"))
    }

    /// Number of stored entries.
    pub fn len(&self) -> Result<usize, CacheError> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM definition_cache", [], |row| row.get(0))
            .map_err(CacheError::backend)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl CacheStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.conn()?
            .query_row(
                "SELECT value FROM definition_cache WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(CacheError::backend)
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        let now = Utc::now().to_rfc3339();
        self.conn()?
            .execute(
                "INSERT INTO definition_cache (key, value, updated_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map_err(CacheError::backend)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.conn()?
            .execute("DELETE FROM definition_cache WHERE key = ?1", params![key])
            .map_err(CacheError::backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete_in_memory() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.get("k").unwrap().is_none());

        store.set("k", b"first".to_vec()).unwrap();
        store.set("k", b"second".to_vec()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"second"[..]));
        assert_eq!(store.len().unwrap(), 1);

        store.delete("k").unwrap();
        store.delete("k").unwrap();
        assert!(store.get("k").unwrap().is_none());
        assert_eq!(store.len().unwrap(), 0);
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.set("tessera_fetcher:g:en", b"payload".to_vec()).unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get("tessera_fetcher:g:en").unwrap().as_deref(),
            Some(&b"payload"[..])
        );
    }
}
