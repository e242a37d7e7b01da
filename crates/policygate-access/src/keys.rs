//! Loading authority key material from the ledger.

use std::marker::PhantomData;

use policygate_core::{AbeScheme, KeyCodec, StateKeys};
use policygate_store::LedgerStore;

use crate::error::KeyError;

/// Reads and decodes the stored public and master keys.
pub struct KeyLoader<'a, S, L> {
    store: &'a L,
    keys: &'a StateKeys,
    _scheme: PhantomData<fn() -> S>,
}

impl<'a, S: AbeScheme, L: LedgerStore> KeyLoader<'a, S, L> {
    pub fn new(store: &'a L, keys: &'a StateKeys) -> Self {
        Self {
            store,
            keys,
            _scheme: PhantomData,
        }
    }

    /// The stored public key, both as encoded bytes and decoded.
    pub async fn public_key(&self) -> Result<(Vec<u8>, S::PublicKey), KeyError> {
        let bytes = self.raw(&self.keys.public_key).await?;
        let key = KeyCodec::<S>::decode_public_key(&bytes)?;
        Ok((bytes, key))
    }

    pub async fn master_key(&self) -> Result<S::MasterKey, KeyError> {
        let bytes = self.raw(&self.keys.master_key).await?;
        Ok(KeyCodec::<S>::decode_master_key(&bytes)?)
    }

    async fn raw(&self, key: &str) -> Result<Vec<u8>, KeyError> {
        match self.store.get_state(key).await? {
            Some(bytes) if !bytes.is_empty() => Ok(bytes),
            _ => Err(KeyError::Missing(key.to_string())),
        }
    }
}
