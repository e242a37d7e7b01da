//! # Policy Gate
//!
//! Policy-gated decryption for ciphertext-policy attribute-based encryption
//! (CP-ABE) on a permissioned ledger.
//!
//! ## Overview
//!
//! Data is encrypted once under a boolean policy over attributes. Any party
//! whose ledger-issued attribute keys satisfy the policy may decrypt, and
//! every attempt, successful or not, is recorded against the protected
//! object.
//!
//! - **Attributes**: human-readable labels hashed to 32-bit attribute ids
//! - **Provenance**: the public key is released only for recorded
//!   transactions
//! - **Audit**: an append-only `[{"id", "result"}]` log per object
//!
//! ## Usage
//!
//! ```rust,no_run
//! use policygate::{Gateway, GatewayConfig};
//! use policygate::store::SqliteStore;
//! use policygate_testkit::TestScheme;
//!
//! async fn example() {
//!     let scheme = TestScheme::new();
//!     let keys = Gateway::<TestScheme, SqliteStore>::setup(&scheme).unwrap();
//!
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!     let gateway = Gateway::new(scheme, store, GatewayConfig::default());
//!     gateway
//!         .init(&[keys.public_key_hex, keys.master_key_hex])
//!         .await
//!         .unwrap();
//!
//!     gateway.invoke("appendTrans", &["alice", "bob", "tx-1"]).await;
//!     let public_key = gateway.invoke("beforeEncrypt", &["alice", "bob", "tx-1"]).await;
//!     assert!(public_key.is_success());
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `policygate::core` - Attribute codec, policies, key envelopes, scheme trait
//! - `policygate::store` - Ledger state abstraction and SQLite
//! - `policygate::access` - Provenance gate, audit log, access controller

pub mod config;
pub mod error;
pub mod gateway;

// Re-export component crates
pub use policygate_access as access;
pub use policygate_core as core;
pub use policygate_store as store;

// Re-export main types for convenience
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, KeyMaterial, Operation, Response, APPEND_SUCCESS};

// Re-export commonly used core types
pub use policygate_core::{
    encode, AbeScheme, AttributeId, AttributeSet, AuditRecord, Policy, StateKeys, TransactionRef,
};
pub use policygate_store::{LedgerStore, MemoryStore, SqliteStore};

#[cfg(feature = "rabe")]
pub use policygate_core::Ac17Scheme;
