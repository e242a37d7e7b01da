//! Error types for the Gateway.

use policygate_access::{AccessError, AuditError, EncryptError, ProvenanceError};
use policygate_core::SchemeError;
use policygate_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Bad configuration or bootstrap key material.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Wrong number or shape of call arguments.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Provenance gate error.
    #[error("provenance error: {0}")]
    Provenance(#[from] ProvenanceError),

    /// Encryption error.
    #[error("encryption error: {0}")]
    Encrypt(#[from] EncryptError),

    /// Decryption was denied or could not be audited.
    #[error("access error: {0}")]
    Access(#[from] AccessError),

    /// Audit log error.
    #[error("audit error: {0}")]
    Audit(#[from] AuditError),

    /// Key generation error.
    #[error("scheme error: {0}")]
    Scheme(#[from] SchemeError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for Gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
