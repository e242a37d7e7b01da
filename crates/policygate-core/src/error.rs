//! Error types for Policy Gate Core.

use thiserror::Error;

use crate::codec::KeyKind;

/// Errors from encoding or decoding key envelopes.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("malformed envelope: {0}")]
    Malformed(String),

    #[error("unsupported envelope version: {0}")]
    UnsupportedVersion(u64),

    #[error("unknown key kind: {0}")]
    UnknownKind(u64),

    #[error("key kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: KeyKind, found: KeyKind },

    #[error("body does not decode as {kind}: {reason}")]
    Body { kind: KeyKind, reason: String },

    #[error("encoding error: {0}")]
    Encode(String),
}

/// Errors from parsing a policy expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("empty policy")]
    Empty,

    #[error("unexpected token {token:?} at offset {offset}")]
    UnexpectedToken { token: String, offset: usize },

    #[error("unexpected end of policy")]
    UnexpectedEnd,

    #[error("invalid attribute identifier {0:?}")]
    InvalidAttribute(String),
}

/// Errors raised by an ABE primitive.
#[derive(Debug, Clone, Error)]
pub enum SchemeError {
    #[error("master key generation failed: {0}")]
    Setup(String),

    #[error("attribute key generation failed: {0}")]
    KeyGeneration(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("attributes do not satisfy the ciphertext policy")]
    Unsatisfied,

    /// The primitive panicked; the panic was caught at the call boundary.
    #[error("primitive fault in {operation}: {message}")]
    Fault {
        operation: &'static str,
        message: String,
    },
}
