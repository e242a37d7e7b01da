//! # Policy Gate Core
//!
//! Pure primitives for Policy Gate: attribute hashing, boolean policies,
//! versioned key envelopes, and the interface to the CP-ABE primitive.
//!
//! This crate contains no I/O and no storage. The pairing algebra itself is
//! supplied by an implementation of [`AbeScheme`].
//!
//! ## Key Types
//!
//! - [`AttributeId`] / [`AttributeSet`] - Hashed attribute identifiers
//! - [`Policy`] - Boolean formula over attribute identifiers
//! - [`KeyCodec`] - Versioned encoding of keys and ciphertexts
//! - [`AbeScheme`] - The CP-ABE primitive interface
//! - [`AuditRecord`] / [`TransactionRef`] - Ledger records
//!
//! ## Encoding
//!
//! Key material is wrapped in a CBOR envelope that names its version and
//! kind. See the [`codec`] module.

#[cfg(feature = "rabe")]
pub mod ac17;
pub mod attribute;
pub mod codec;
pub mod error;
pub mod policy;
pub mod scheme;
pub mod types;

pub use attribute::{encode, encode_all, fnv1_32, AttributeId, AttributeSet};
pub use codec::{KeyCodec, KeyKind, ENVELOPE_VERSION};
pub use error::{CodecError, PolicyError, SchemeError};
pub use policy::Policy;
pub use scheme::{AbeScheme, SchemeValue};
pub use types::{AuditRecord, StateKeys, TransactionRef};

#[cfg(feature = "rabe")]
pub use ac17::Ac17Scheme;
