//! Policy-gated decryption with unconditional audit.
//!
//! A decryption request derives a one-shot attribute key from the caller's
//! labels, attempts decryption, and appends exactly one audit record for the
//! object whatever the outcome. Callers learn only success or
//! [`AccessError::Denied`]; the reason for a denial is logged at debug level.

use std::fmt;

use policygate_core::{
    encode_all, AbeScheme, AuditRecord, CodecError, KeyCodec, SchemeError, StateKeys,
};
use policygate_store::LedgerStore;

use crate::audit::AuditLog;
use crate::error::{AccessError, KeyError};
use crate::guard::guarded;
use crate::keys::KeyLoader;

/// Default bound on labels per request.
pub const DEFAULT_MAX_ATTRIBUTES: usize = 64;

/// Why a decryption attempt was refused. Never leaves this module.
#[derive(Debug)]
enum Denial {
    TooManyAttributes(usize),
    MasterKey(KeyError),
    KeyGeneration(SchemeError),
    Ciphertext(CodecError),
    PublicKey(KeyError),
    Decryption(SchemeError),
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::TooManyAttributes(n) => write!(f, "{} attribute labels exceed the limit", n),
            Denial::MasterKey(e) => write!(f, "master key: {}", e),
            Denial::KeyGeneration(e) => write!(f, "attribute keys: {}", e),
            Denial::Ciphertext(e) => write!(f, "ciphertext: {}", e),
            Denial::PublicKey(e) => write!(f, "public key: {}", e),
            Denial::Decryption(e) => write!(f, "decrypt: {}", e),
        }
    }
}

enum CiphertextInput<'b> {
    Bytes(&'b [u8]),
    Hex(&'b str),
}

impl CiphertextInput<'_> {
    fn decode<S: AbeScheme>(&self) -> Result<S::Ciphertext, CodecError> {
        match self {
            CiphertextInput::Bytes(bytes) => KeyCodec::<S>::decode_ciphertext(bytes),
            CiphertextInput::Hex(text) => {
                KeyCodec::<S>::decode_ciphertext(&KeyCodec::<S>::from_hex(text)?)
            }
        }
    }
}

/// Derives attribute keys, decrypts and records the attempt.
pub struct AccessController<'a, S, L> {
    scheme: &'a S,
    store: &'a L,
    keys: &'a StateKeys,
    max_attributes: usize,
}

impl<'a, S: AbeScheme, L: LedgerStore> AccessController<'a, S, L> {
    pub fn new(scheme: &'a S, store: &'a L, keys: &'a StateKeys) -> Self {
        Self {
            scheme,
            store,
            keys,
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
        }
    }

    pub fn with_max_attributes(mut self, max_attributes: usize) -> Self {
        self.max_attributes = max_attributes;
        self
    }

    /// Decrypt `ciphertext` for `actor_id` holding `labels`.
    ///
    /// Exactly one audit record is appended under `object_id`. A failure to
    /// append it is returned as [`AccessError::Audit`] even if decryption
    /// succeeded, and no plaintext is released.
    pub async fn decrypt<T>(
        &self,
        ciphertext: &[u8],
        object_id: &str,
        actor_id: &str,
        labels: &[T],
    ) -> Result<Vec<u8>, AccessError>
    where
        T: AsRef<str> + Sync,
    {
        self.decrypt_input(CiphertextInput::Bytes(ciphertext), object_id, actor_id, labels)
            .await
    }

    /// As [`decrypt`](Self::decrypt), with the ciphertext hex-encoded.
    /// Undecodable hex is a denial.
    pub async fn decrypt_hex<T>(
        &self,
        ciphertext_hex: &str,
        object_id: &str,
        actor_id: &str,
        labels: &[T],
    ) -> Result<Vec<u8>, AccessError>
    where
        T: AsRef<str> + Sync,
    {
        self.decrypt_input(CiphertextInput::Hex(ciphertext_hex), object_id, actor_id, labels)
            .await
    }

    async fn decrypt_input<T>(
        &self,
        ciphertext: CiphertextInput<'_>,
        object_id: &str,
        actor_id: &str,
        labels: &[T],
    ) -> Result<Vec<u8>, AccessError>
    where
        T: AsRef<str> + Sync,
    {
        let outcome = self.attempt(&ciphertext, labels).await;

        AuditLog::new(self.store, self.keys)
            .append(object_id, &AuditRecord::new(actor_id, outcome.is_ok()))
            .await?;

        outcome.map_err(|denial| {
            tracing::debug!(object_id, actor_id, reason = %denial, "decryption denied");
            AccessError::Denied
        })
    }

    async fn attempt<T>(
        &self,
        ciphertext: &CiphertextInput<'_>,
        labels: &[T],
    ) -> Result<Vec<u8>, Denial>
    where
        T: AsRef<str> + Sync,
    {
        if labels.len() > self.max_attributes {
            return Err(Denial::TooManyAttributes(labels.len()));
        }
        let attributes = encode_all(labels.iter().map(|l| l.as_ref()));

        let loader = KeyLoader::<S, L>::new(self.store, self.keys);
        let master_key = loader.master_key().await.map_err(Denial::MasterKey)?;

        let attribute_keys = guarded("generate_attribute_keys", || {
            self.scheme.generate_attribute_keys(&attributes, &master_key)
        })
        .map_err(Denial::KeyGeneration)?;

        let ciphertext = ciphertext.decode::<S>().map_err(Denial::Ciphertext)?;

        let (_, public_key) = loader.public_key().await.map_err(Denial::PublicKey)?;

        guarded("decrypt", || {
            self.scheme.decrypt(&ciphertext, &attribute_keys, &public_key)
        })
        .map_err(Denial::Decryption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use async_trait::async_trait;
    use policygate_core::{encode, Policy};
    use policygate_store::{MemoryStore, StoreError};
    use policygate_testkit::{FaultMode, TestFixture, TestScheme};

    fn controller(fixture: &TestFixture) -> AccessController<'_, TestScheme, MemoryStore> {
        AccessController::new(&fixture.scheme, fixture.store.as_ref(), &fixture.keys)
    }

    async fn audit(fixture: &TestFixture, object_id: &str) -> Vec<AuditRecord> {
        AuditLog::new(fixture.store.as_ref(), &fixture.keys)
            .records(object_id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_matching_attributes_decrypt() {
        let fixture = TestFixture::bootstrapped().await;
        let ct = fixture.encrypt_for("dept1", b"secret");
        let controller = controller(&fixture);

        let plain = controller
            .decrypt(&ct, "f1", "u1", &["dept1", "loc_212"])
            .await
            .unwrap();
        assert_eq!(plain, b"secret");
        assert_eq!(audit(&fixture, "f1").await, vec![AuditRecord::new("u1", true)]);
    }

    #[tokio::test]
    async fn test_wrong_attributes_denied_and_audited() {
        let fixture = TestFixture::bootstrapped().await;
        let ct = fixture.encrypt_for("dept1", b"secret");
        let controller = controller(&fixture);

        assert!(matches!(
            controller.decrypt(&ct, "f1", "u2", &["other"]).await,
            Err(AccessError::Denied)
        ));
        assert_eq!(audit(&fixture, "f1").await, vec![AuditRecord::new("u2", false)]);
    }

    #[tokio::test]
    async fn test_labels_are_case_sensitive() {
        let fixture = TestFixture::bootstrapped().await;
        let ct = fixture.encrypt_for("dept1", b"secret");
        let controller = controller(&fixture);

        assert!(controller.decrypt(&ct, "f1", "u1", &["Dept1"]).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_labels_denied() {
        let fixture = TestFixture::bootstrapped().await;
        let ct = fixture.encrypt_for("dept1", b"secret");
        let controller = controller(&fixture);

        let none: [&str; 0] = [];
        assert!(matches!(
            controller.decrypt(&ct, "f1", "u1", &none).await,
            Err(AccessError::Denied)
        ));
        assert_eq!(audit(&fixture, "f1").await.len(), 1);
    }

    #[tokio::test]
    async fn test_conjunctive_policy() {
        let fixture = TestFixture::bootstrapped().await;
        let policy = Policy::and([
            Policy::attribute(encode("dept1")),
            Policy::attribute(encode("loc_212")),
        ]);
        let ct = fixture.encrypt_under(&policy, b"both");
        let controller = controller(&fixture);

        assert!(controller.decrypt(&ct, "f1", "u1", &["dept1"]).await.is_err());
        assert_eq!(
            controller
                .decrypt(&ct, "f1", "u1", &["loc_212", "dept1"])
                .await
                .unwrap(),
            b"both"
        );
        assert_eq!(
            audit(&fixture, "f1").await,
            vec![AuditRecord::new("u1", false), AuditRecord::new("u1", true)]
        );
    }

    #[tokio::test]
    async fn test_missing_master_key_is_denial() {
        let fixture = TestFixture::new();
        let ct = fixture.encrypt_for("dept1", b"secret");
        let controller = controller(&fixture);

        assert!(matches!(
            controller.decrypt(&ct, "f1", "u1", &["dept1"]).await,
            Err(AccessError::Denied)
        ));
        assert_eq!(audit(&fixture, "f1").await, vec![AuditRecord::new("u1", false)]);
    }

    #[tokio::test]
    async fn test_malformed_ciphertext_is_denial() {
        let fixture = TestFixture::bootstrapped().await;
        let controller = controller(&fixture);

        assert!(matches!(
            controller.decrypt(b"junk", "f1", "u1", &["dept1"]).await,
            Err(AccessError::Denied)
        ));
        assert!(matches!(
            controller.decrypt_hex("zz", "f1", "u1", &["dept1"]).await,
            Err(AccessError::Denied)
        ));
        assert_eq!(audit(&fixture, "f1").await.len(), 2);
    }

    #[tokio::test]
    async fn test_hex_ciphertext() {
        let fixture = TestFixture::bootstrapped().await;
        let ct = fixture.encrypt_for_hex("dept1", b"secret");
        let controller = controller(&fixture);

        assert_eq!(
            controller.decrypt_hex(&ct, "f1", "u1", &["dept1"]).await.unwrap(),
            b"secret"
        );
    }

    #[tokio::test]
    async fn test_too_many_labels_denied() {
        let fixture = TestFixture::bootstrapped().await;
        let ct = fixture.encrypt_for("dept1", b"secret");
        let controller = controller(&fixture).with_max_attributes(2);

        assert!(matches!(
            controller
                .decrypt(&ct, "f1", "u1", &["dept1", "a", "b"])
                .await,
            Err(AccessError::Denied)
        ));
        assert_eq!(audit(&fixture, "f1").await, vec![AuditRecord::new("u1", false)]);
    }

    #[tokio::test]
    async fn test_primitive_panics_are_denials() {
        for fault in [
            FaultMode::PanicOnDecrypt,
            FaultMode::PanicOnKeyGeneration,
            FaultMode::FailKeyGeneration,
        ] {
            let fixture = TestFixture::bootstrapped().await;
            let ct = fixture.encrypt_for("dept1", b"secret");
            let scheme = TestScheme::with_fault(fault);
            let controller = AccessController::new(&scheme, fixture.store.as_ref(), &fixture.keys);

            assert!(matches!(
                controller.decrypt(&ct, "f1", "u1", &["dept1"]).await,
                Err(AccessError::Denied)
            ));
            assert_eq!(audit(&fixture, "f1").await, vec![AuditRecord::new("u1", false)]);
        }
    }

    #[tokio::test]
    async fn test_reserved_object_id_is_audit_error() {
        let fixture = TestFixture::bootstrapped().await;
        let ct = fixture.encrypt_for("dept1", b"secret");
        let controller = controller(&fixture);

        assert!(matches!(
            controller.decrypt(&ct, "master_key", "u1", &["dept1"]).await,
            Err(AccessError::Audit(AuditError::InvalidObjectId(_)))
        ));
    }

    /// Reads from an inner store, refuses every write.
    struct ReadOnly(MemoryStore);

    #[async_trait]
    impl LedgerStore for ReadOnly {
        async fn get_state(&self, key: &str) -> policygate_store::Result<Option<Vec<u8>>> {
            self.0.get_state(key).await
        }

        async fn put_state(&self, _key: &str, _value: &[u8]) -> policygate_store::Result<()> {
            Err(StoreError::Poisoned("read-only".into()))
        }
    }

    #[tokio::test]
    async fn test_audit_write_failure_withholds_plaintext() {
        let fixture = TestFixture::new();
        let inner = MemoryStore::new();
        inner.put_state("public_key", &fixture.public_key_bytes()).await.unwrap();
        inner.put_state("master_key", &fixture.master_key_bytes()).await.unwrap();
        let store = ReadOnly(inner);

        let ct = fixture.encrypt_for("dept1", b"secret");
        let controller = AccessController::new(&fixture.scheme, &store, &fixture.keys);

        assert!(matches!(
            controller.decrypt(&ct, "f1", "u1", &["dept1"]).await,
            Err(AccessError::Audit(AuditError::Store(_)))
        ));
    }
}
