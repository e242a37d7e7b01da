//! In-memory implementation of the LedgerStore trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::{Result, StoreError};
use crate::traits::{check_key, LedgerStore};

/// In-memory world state.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
/// Keys are kept ordered, as on the ledger.
pub struct MemoryStore {
    inner: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    /// True when nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all keys, in order.
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Poisoned(e.to_string())
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>> {
        check_key(key)?;
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.get(key).cloned())
    }

    async fn put_state(&self, key: &str, value: &[u8]) -> Result<()> {
        check_key(key)?;
        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn has_state(&self, key: &str) -> Result<bool> {
        check_key(key)?;
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.contains_key(key))
    }
}
