//! # Policy Gate Access
//!
//! Provenance-gated encryption and audited, policy-gated decryption.
//!
//! ## Overview
//!
//! Access control here is attribute-based: a ciphertext carries a boolean
//! policy over attribute ids, and a reader holds attribute keys derived by
//! the ledger from the reader's labels. This crate supplies the ledger-side
//! workflow around the ABE primitive:
//!
//! - **ProvenanceGate**: releases the public key only for recorded
//!   transactions
//! - **PolicyEncryptor**: encrypts a payload under a policy once the gate
//!   has released the key
//! - **AccessController**: derives one-shot attribute keys, decrypts, and
//!   records every attempt
//! - **AuditLog**: the append-only per-object record of attempts
//!
//! ## Denials
//!
//! A reader whose attributes do not satisfy the policy, or whose request
//! fails for any other reason, gets [`AccessError::Denied`] with no detail.
//! The attempt is still recorded. Primitive panics are caught and count as
//! denials.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use policygate_access::{AccessController, AuditLog};
//! use policygate_testkit::TestFixture;
//!
//! # async fn demo() {
//! let fixture = TestFixture::bootstrapped().await;
//! let ciphertext = fixture.encrypt_for("dept1", b"report");
//!
//! let controller =
//!     AccessController::new(&fixture.scheme, fixture.store.as_ref(), &fixture.keys);
//! let plain = controller
//!     .decrypt(&ciphertext, "report-7", "alice", &["dept1"])
//!     .await;
//! assert!(plain.is_ok());
//!
//! let log = AuditLog::new(fixture.store.as_ref(), &fixture.keys);
//! assert_eq!(log.records("report-7").await.unwrap().len(), 1);
//! # }
//! ```

pub mod audit;
pub mod controller;
pub mod encrypt;
pub mod error;
pub mod guard;
pub mod keys;
pub mod provenance;

pub use audit::AuditLog;
pub use controller::{AccessController, DEFAULT_MAX_ATTRIBUTES};
pub use encrypt::PolicyEncryptor;
pub use error::{AccessError, AuditError, EncryptError, KeyError, ProvenanceError};
pub use guard::guarded;
pub use keys::KeyLoader;
pub use provenance::{ProvenanceGate, ReleasedPublicKey, TransactionStatus, MARKER_VALUE};
