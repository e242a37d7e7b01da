//! # Policy Gate Testkit
//!
//! Testing utilities for Policy Gate.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Test scheme**: [`TestScheme`], an [`AbeScheme`](policygate_core::AbeScheme)
//!   that enforces policies faithfully but is NOT confidential against
//!   public-key holders. Never deploy it.
//! - **Golden vectors**: Known attribute labels with their expected ids
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper structs for setting up a bootstrapped ledger
//!
//! ## Golden Vectors
//!
//! Attribute ids must stay stable across releases, or existing ciphertexts
//! become undecryptable:
//!
//! ```rust
//! use policygate_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! assert!(verify_all_vectors().is_ok());
//! for vector in all_vectors() {
//!     println!("{:?} -> {}", vector.label, vector.id);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use policygate_testkit::generators::attribute_label;
//!
//! proptest! {
//!     #[test]
//!     fn encode_is_stable(label in attribute_label()) {
//!         prop_assert_eq!(policygate_core::encode(&label), policygate_core::encode(&label));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use policygate_testkit::fixtures::TestFixture;
//!
//! let fixture = TestFixture::new();
//! let ciphertext = fixture.encrypt_for("dept1", b"secret");
//! assert!(!ciphertext.is_empty());
//! ```

pub mod fixtures;
pub mod generators;
pub mod scheme;
pub mod vectors;

pub use fixtures::{multi_authority_fixtures, TestFixture};
pub use scheme::{
    FaultMode, TestAttributeKeys, TestCiphertext, TestMasterKey, TestPublicKey, TestScheme,
};
pub use vectors::{all_vectors, verify_all_vectors, AttributeVector};
