//! # Policy Gate Store
//!
//! Ledger world-state abstraction for Policy Gate. Provides a trait-based
//! key-value interface with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! Everything Policy Gate persists (key material, transaction markers, audit
//! trails) lives behind the [`LedgerStore`] trait as `key -> bytes` entries
//! with GetState/PutState semantics. The primary implementation is
//! [`SqliteStore`], with [`MemoryStore`] for tests.
//!
//! ## Key Types
//!
//! - [`LedgerStore`] - The async trait for state reads and writes
//! - [`SqliteStore`] - SQLite-based persistent world state
//! - [`MemoryStore`] - In-memory world state for tests
//!
//! ## Usage
//!
//! ```rust,no_run
//! use policygate_store::{LedgerStore, SqliteStore};
//!
//! async fn example() {
//!     // Open a SQLite database
//!     let store = SqliteStore::open("ledger.db").unwrap();
//!
//!     // Or use an in-memory database for testing
//!     let store = SqliteStore::open_memory().unwrap();
//!
//!     store.put_state("trans_dept1_dept2_tx1", b"yes").await.unwrap();
//!     assert!(store.has_state("trans_dept1_dept2_tx1").await.unwrap());
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Missing is not an error**: `get_state` returns `None` for absent keys
//! - **Last write wins**: `put_state` overwrites; append-only semantics are
//!   enforced by callers
//! - **Isolation** is the backend's job; callers do plain read-modify-write

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::LedgerStore;
