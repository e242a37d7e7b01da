//! SQLite implementation of the LedgerStore trait.
//!
//! This is the primary storage backend. It uses rusqlite with bundled SQLite,
//! wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{check_key, LedgerStore};

/// SQLite-based world state.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Number of writes ever made to `key` (0 if absent).
    pub async fn revision(&self, key: &str) -> Result<u64> {
        let key = key.to_string();
        self.blocking(move |conn| {
            let rev: Option<i64> = conn
                .query_row(
                    "SELECT revision FROM world_state WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(rev.unwrap_or(0) as u64)
        })
        .await
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("mutex poisoned: {}", e)))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

#[async_trait]
impl LedgerStore for SqliteStore {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        check_key(key)?;
        let key = key.to_string();
        self.blocking(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM world_state WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(value)
        })
        .await
    }

    async fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        check_key(key)?;
        let key = key.to_string();
        let value = value.to_vec();
        self.blocking(move |conn| {
            conn.execute(
                "INSERT INTO world_state (key, value, revision, updated_at)
                 VALUES (?1, ?2, 1, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    revision = world_state.revision + 1,
                    updated_at = excluded.updated_at",
                params![key, value, migration::now_millis()],
            )?;
            tracing::trace!(%key, len = value.len(), "put state");
            Ok(())
        })
        .await
    }

    async fn has_state(&self, key: &str) -> Result<bool> {
        check_key(key)?;
        let key = key.to_string();
        self.blocking(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM world_state WHERE key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_put_get() {
        let store = SqliteStore::open_memory().unwrap();

        store.put_state("master_key", &[1, 2, 3]).await.unwrap();
        assert_eq!(
            store.get_state("master_key").await.unwrap(),
            Some(vec![1, 2, 3])
        );
        assert!(store.has_state("master_key").await.unwrap());
        assert!(!store.has_state("public_key").await.unwrap());
        assert_eq!(store.get_state("public_key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sqlite_overwrite_bumps_revision() {
        let store = SqliteStore::open_memory().unwrap();

        assert_eq!(store.revision("f1").await.unwrap(), 0);
        store.put_state("f1", b"[]").await.unwrap();
        store.put_state("f1", b"[{}]").await.unwrap();

        assert_eq!(store.revision("f1").await.unwrap(), 2);
        assert_eq!(store.get_state("f1").await.unwrap(), Some(b"[{}]".to_vec()));
    }

    #[tokio::test]
    async fn test_sqlite_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.put_state("trans_a_b_1", b"yes").await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get_state("trans_a_b_1").await.unwrap(),
            Some(b"yes".to_vec())
        );
    }

    #[tokio::test]
    async fn test_sqlite_rejects_empty_key() {
        let store = SqliteStore::open_memory().unwrap();
        assert!(matches!(
            store.get_state("").await,
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_sqlite_empty_value_is_present() {
        let store = SqliteStore::open_memory().unwrap();
        store.put_state("k", b"").await.unwrap();
        assert_eq!(store.get_state("k").await.unwrap(), Some(Vec::new()));
    }
}
