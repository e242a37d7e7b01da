//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use policygate_core::{encode, AbeScheme, KeyCodec, Policy, StateKeys, TransactionRef};
use policygate_store::{LedgerStore, MemoryStore, StoreError};

use crate::scheme::{TestMasterKey, TestPublicKey, TestScheme};

/// A test fixture with an authority key pair and a memory store.
pub struct TestFixture {
    pub scheme: TestScheme,
    pub store: Arc<MemoryStore>,
    pub keys: StateKeys,
    pub public_key: TestPublicKey,
    pub master_key: TestMasterKey,
}

impl TestFixture {
    /// Create a new test fixture with a random key pair.
    pub fn new() -> Self {
        let mut seed = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut seed);
        Self::with_seed(seed)
    }

    /// Create with a deterministic key pair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let (public_key, master_key) = TestScheme::keys_from_seed(seed);
        Self {
            scheme: TestScheme::new(),
            store: Arc::new(MemoryStore::new()),
            keys: StateKeys::default(),
            public_key,
            master_key,
        }
    }

    /// A fixture whose keys are already on the ledger.
    pub async fn bootstrapped() -> Self {
        let fixture = Self::new();
        fixture
            .install_keys()
            .await
            .expect("memory store accepts writes");
        fixture
    }

    pub fn public_key_bytes(&self) -> Vec<u8> {
        KeyCodec::<TestScheme>::encode_public_key(&self.public_key)
            .expect("test public key encodes")
    }

    pub fn master_key_bytes(&self) -> Vec<u8> {
        KeyCodec::<TestScheme>::encode_master_key(&self.master_key)
            .expect("test master key encodes")
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    pub fn master_key_hex(&self) -> String {
        hex::encode(self.master_key_bytes())
    }

    /// Write both keys under their state keys.
    pub async fn install_keys(&self) -> Result<(), StoreError> {
        self.store
            .put_state(&self.keys.public_key, &self.public_key_bytes())
            .await?;
        self.store
            .put_state(&self.keys.master_key, &self.master_key_bytes())
            .await
    }

    /// Write a transaction marker directly, bypassing any gate.
    pub async fn record_transaction(
        &self,
        from: &str,
        to: &str,
        transaction_id: &str,
    ) -> Result<(), StoreError> {
        let key = self
            .keys
            .transaction(&TransactionRef::new(from, to, transaction_id));
        self.store.put_state(&key, b"yes").await
    }

    /// Encrypt under a single-attribute policy and encode the ciphertext.
    pub fn encrypt_for(&self, label: &str, plaintext: &[u8]) -> Vec<u8> {
        self.encrypt_under(&Policy::attribute(encode(label)), plaintext)
    }

    /// Encrypt under `policy` and encode the ciphertext.
    pub fn encrypt_under(&self, policy: &Policy, plaintext: &[u8]) -> Vec<u8> {
        let ct = self
            .scheme
            .encrypt(plaintext, policy, &self.public_key)
            .expect("test scheme encrypts");
        KeyCodec::<TestScheme>::encode_ciphertext(&ct).expect("test ciphertext encodes")
    }

    /// Hex form of [`encrypt_for`](Self::encrypt_for).
    pub fn encrypt_for_hex(&self, label: &str, plaintext: &[u8]) -> String {
        hex::encode(self.encrypt_for(label, plaintext))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create fixtures for independent authorities.
pub fn multi_authority_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = 0xab;
            TestFixture::with_seed(seed)
        })
        .collect()
}
