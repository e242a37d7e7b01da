//! Append-only per-object audit log.
//!
//! Each protected object has one state entry, keyed by its id, holding a JSON
//! array of `{"id": actor, "result": bool}` records in attempt order.

use policygate_core::{AuditRecord, StateKeys};
use policygate_store::LedgerStore;

use crate::error::AuditError;

pub struct AuditLog<'a, L> {
    store: &'a L,
    keys: &'a StateKeys,
}

impl<'a, L: LedgerStore> AuditLog<'a, L> {
    pub fn new(store: &'a L, keys: &'a StateKeys) -> Self {
        Self { store, keys }
    }

    /// Append `record` to the object's log and return the new length.
    ///
    /// An existing blob that does not parse is left untouched and reported
    /// as [`AuditError::Corrupt`].
    pub async fn append(
        &self,
        object_id: &str,
        record: &AuditRecord,
    ) -> Result<usize, AuditError> {
        let mut records = self.records(object_id).await?;
        records.push(record.clone());

        let bytes =
            serde_json::to_vec(&records).map_err(|e| AuditError::Serialization(e.to_string()))?;
        self.store.put_state(object_id, &bytes).await?;

        tracing::debug!(
            object_id,
            actor_id = %record.actor_id,
            succeeded = record.succeeded,
            count = records.len(),
            "audit record appended"
        );
        Ok(records.len())
    }

    /// All records for the object, oldest first. Empty if none.
    pub async fn records(&self, object_id: &str) -> Result<Vec<AuditRecord>, AuditError> {
        let raw = self.raw(object_id).await?;
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&raw).map_err(|e| AuditError::Corrupt {
            object_id: object_id.to_string(),
            reason: e.to_string(),
        })
    }

    /// The stored JSON exactly as persisted. Empty if none.
    pub async fn raw(&self, object_id: &str) -> Result<Vec<u8>, AuditError> {
        self.check_object_id(object_id)?;
        Ok(self.store.get_state(object_id).await?.unwrap_or_default())
    }

    fn check_object_id(&self, object_id: &str) -> Result<(), AuditError> {
        if object_id.is_empty() || self.keys.is_reserved(object_id) {
            return Err(AuditError::InvalidObjectId(object_id.to_string()));
        }
        Ok(())
    }
}
