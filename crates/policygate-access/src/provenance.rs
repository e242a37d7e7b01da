//! The transaction-provenance gate.
//!
//! A party may only obtain the public key for encryption after the
//! transaction it claims to be encrypting for has been recorded on the
//! ledger. Markers are write-once presence flags under
//! `<prefix>_<from>_<to>_<transaction_id>`.

use std::marker::PhantomData;

use policygate_core::{AbeScheme, StateKeys, TransactionRef};
use policygate_store::LedgerStore;

use crate::error::{KeyError, ProvenanceError};
use crate::keys::KeyLoader;

/// Value written to a transaction marker.
pub const MARKER_VALUE: &[u8] = b"yes";

/// Whether a transaction marker exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Present,
    Absent,
}

/// A public key released for one recorded transaction.
pub struct ReleasedPublicKey<S: AbeScheme> {
    /// The key exactly as stored.
    pub bytes: Vec<u8>,
    pub key: S::PublicKey,
}

/// Records transactions and releases the public key against them.
pub struct ProvenanceGate<'a, S, L> {
    store: &'a L,
    keys: &'a StateKeys,
    _scheme: PhantomData<fn() -> S>,
}

impl<'a, S: AbeScheme, L: LedgerStore> ProvenanceGate<'a, S, L> {
    pub fn new(store: &'a L, keys: &'a StateKeys) -> Self {
        Self {
            store,
            keys,
            _scheme: PhantomData,
        }
    }

    /// Record a transaction marker. Recording an existing triple is a no-op.
    pub async fn record_transaction(&self, tx: &TransactionRef) -> Result<(), ProvenanceError> {
        let key = self.marker_key(tx)?;
        if self.status_of(&key).await? == TransactionStatus::Present {
            tracing::debug!(%tx, "transaction already recorded");
            return Ok(());
        }
        self.store.put_state(&key, MARKER_VALUE).await?;
        tracing::info!(%tx, "transaction recorded");
        Ok(())
    }

    pub async fn check_transaction(
        &self,
        tx: &TransactionRef,
    ) -> Result<TransactionStatus, ProvenanceError> {
        let key = self.marker_key(tx)?;
        self.status_of(&key).await
    }

    /// Release the stored public key if `tx` was recorded.
    pub async fn release(
        &self,
        tx: &TransactionRef,
    ) -> Result<ReleasedPublicKey<S>, ProvenanceError> {
        if self.check_transaction(tx).await? == TransactionStatus::Absent {
            tracing::debug!(%tx, "public key release denied");
            return Err(ProvenanceError::NoSuchTransaction(tx.clone()));
        }

        match KeyLoader::<S, L>::new(self.store, self.keys).public_key().await {
            Ok((bytes, key)) => Ok(ReleasedPublicKey { bytes, key }),
            Err(KeyError::Store(e)) => Err(ProvenanceError::Store(e)),
            Err(e) => {
                tracing::warn!(error = %e, "stored public key unusable");
                Err(ProvenanceError::PublicKeyUnavailable(e.to_string()))
            }
        }
    }

    /// Release the stored public key bytes if `tx` was recorded.
    pub async fn release_public_key(
        &self,
        tx: &TransactionRef,
    ) -> Result<Vec<u8>, ProvenanceError> {
        Ok(self.release(tx).await?.bytes)
    }

    fn marker_key(&self, tx: &TransactionRef) -> Result<String, ProvenanceError> {
        if tx.has_empty_part() {
            return Err(ProvenanceError::InvalidTransaction(tx.to_string()));
        }
        Ok(self.keys.transaction(tx))
    }

    async fn status_of(&self, key: &str) -> Result<TransactionStatus, ProvenanceError> {
        // The ledger cannot distinguish an empty value from no value.
        Ok(match self.store.get_state(key).await? {
            Some(value) if !value.is_empty() => TransactionStatus::Present,
            _ => TransactionStatus::Absent,
        })
    }
}
