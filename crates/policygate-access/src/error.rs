//! Error types for the access module.

use policygate_core::{CodecError, PolicyError, SchemeError, TransactionRef};
use policygate_store::StoreError;
use thiserror::Error;

/// Errors from loading key material off the ledger.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Nothing stored under the key.
    #[error("no key material under {0:?}")]
    Missing(String),

    /// The store could not be read.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The stored bytes do not decode as the expected kind.
    #[error("undecodable key material: {0}")]
    Codec(#[from] CodecError),
}

/// Errors from the transaction-provenance gate.
#[derive(Debug, Error)]
pub enum ProvenanceError {
    /// A component of the transaction triple is empty.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    /// No marker was recorded for the triple.
    #[error("no such transaction: {0}")]
    NoSuchTransaction(TransactionRef),

    /// The public key is missing or does not decode.
    #[error("public key unavailable: {0}")]
    PublicKeyUnavailable(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the per-object audit log.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The object id is empty or collides with a reserved state key.
    #[error("invalid object id: {0:?}")]
    InvalidObjectId(String),

    /// The stored audit blob is not a valid record array.
    #[error("corrupt audit log for {object_id:?}: {reason}")]
    Corrupt { object_id: String, reason: String },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from a policy-gated decryption.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Decryption was refused. The reason is deliberately withheld.
    #[error("decryption denied")]
    Denied,

    /// The attempt could not be recorded.
    #[error("audit failure: {0}")]
    Audit(#[from] AuditError),
}

/// Errors from policy encryption.
#[derive(Debug, Error)]
pub enum EncryptError {
    /// The public key was not released.
    #[error("provenance check failed: {0}")]
    Provenance(#[from] ProvenanceError),

    /// The policy has an empty clause.
    #[error("invalid policy: {0}")]
    Policy(#[from] PolicyError),

    /// A caller-supplied public key does not decode.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(CodecError),

    /// The primitive failed or panicked.
    #[error("scheme error: {0}")]
    Scheme(#[from] SchemeError),

    /// The ciphertext could not be encoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
