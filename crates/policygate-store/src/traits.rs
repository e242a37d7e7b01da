//! LedgerStore trait: the abstract interface for world-state persistence.
//!
//! This trait keeps Policy Gate independent of the ledger it runs on.
//! Implementations include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;

use crate::error::{Result, StoreError};

/// The LedgerStore trait: async GetState/PutState over string keys.
///
/// All methods are async to support both local (SQLite) and remote ledger
/// backends. For SQLite, `spawn_blocking` is used internally to avoid
/// blocking the runtime.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    async fn get_state(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` under `key`, replacing any previous value.
    async fn put_state(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Check whether `key` holds a value.
    async fn has_state(&self, key: &str) -> Result<bool> {
        Ok(self.get_state(key).await?.is_some())
    }
}

/// Reject keys the ledger cannot store.
pub(crate) fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}
