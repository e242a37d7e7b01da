//! Encryption under attribute policies, gated by transaction provenance.

use policygate_core::{encode, AbeScheme, KeyCodec, Policy, StateKeys, TransactionRef};
use policygate_store::LedgerStore;

use crate::error::EncryptError;
use crate::guard::guarded;
use crate::provenance::ProvenanceGate;

/// Encrypts payloads for recorded transactions.
///
/// Errors are detailed: encryption is an operator-facing path and records
/// nothing in any audit log.
pub struct PolicyEncryptor<'a, S, L> {
    scheme: &'a S,
    store: &'a L,
    keys: &'a StateKeys,
}

impl<'a, S: AbeScheme, L: LedgerStore> PolicyEncryptor<'a, S, L> {
    pub fn new(scheme: &'a S, store: &'a L, keys: &'a StateKeys) -> Self {
        Self {
            scheme,
            store,
            keys,
        }
    }

    /// Encrypt `plaintext` so that holders of `department_label` can read it.
    pub async fn encrypt(
        &self,
        plaintext: &[u8],
        department_label: &str,
        tx: &TransactionRef,
    ) -> Result<Vec<u8>, EncryptError> {
        let policy = Policy::attribute(encode(department_label));
        self.encrypt_with_policy(plaintext, &policy, tx).await
    }

    /// Encrypt `plaintext` under an arbitrary policy.
    pub async fn encrypt_with_policy(
        &self,
        plaintext: &[u8],
        policy: &Policy,
        tx: &TransactionRef,
    ) -> Result<Vec<u8>, EncryptError> {
        policy.validate()?;
        let released = ProvenanceGate::<S, L>::new(self.store, self.keys)
            .release(tx)
            .await?;
        let ciphertext = self.seal(plaintext, policy, &released.key)?;
        tracing::debug!(%tx, %policy, len = ciphertext.len(), "payload encrypted");
        Ok(ciphertext)
    }

    /// Finish an encryption with a public key obtained earlier, as hex, from
    /// the provenance gate.
    pub fn encrypt_with_released_key(
        &self,
        public_key_hex: &str,
        plaintext: &[u8],
        policy: &Policy,
    ) -> Result<Vec<u8>, EncryptError> {
        policy.validate()?;
        let public_key = KeyCodec::<S>::from_hex(public_key_hex)
            .and_then(|bytes| KeyCodec::<S>::decode_public_key(&bytes))
            .map_err(EncryptError::InvalidPublicKey)?;
        self.seal(plaintext, policy, &public_key)
    }

    fn seal(
        &self,
        plaintext: &[u8],
        policy: &Policy,
        public_key: &S::PublicKey,
    ) -> Result<Vec<u8>, EncryptError> {
        let ciphertext = guarded("encrypt", || {
            self.scheme.encrypt(plaintext, policy, public_key)
        })?;
        Ok(KeyCodec::<S>::encode_ciphertext(&ciphertext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::AccessController;
    use crate::error::ProvenanceError;
    use policygate_core::{CodecError, PolicyError, SchemeError};
    use policygate_store::MemoryStore;
    use policygate_testkit::{FaultMode, TestFixture, TestScheme};

    fn encryptor(fixture: &TestFixture) -> PolicyEncryptor<'_, TestScheme, MemoryStore> {
        PolicyEncryptor::new(&fixture.scheme, fixture.store.as_ref(), &fixture.keys)
    }

    fn controller(fixture: &TestFixture) -> AccessController<'_, TestScheme, MemoryStore> {
        AccessController::new(&fixture.scheme, fixture.store.as_ref(), &fixture.keys)
    }

    #[tokio::test]
    async fn test_encrypt_requires_recorded_transaction() {
        let fixture = TestFixture::bootstrapped().await;
        let encryptor = encryptor(&fixture);
        let tx = TransactionRef::new("a", "b", "1");

        assert!(matches!(
            encryptor.encrypt(b"secret", "dept1", &tx).await,
            Err(EncryptError::Provenance(ProvenanceError::NoSuchTransaction(_)))
        ));
    }

    #[tokio::test]
    async fn test_encrypt_then_decrypt() {
        let fixture = TestFixture::bootstrapped().await;
        fixture.record_transaction("a", "b", "1").await.unwrap();
        let encryptor = encryptor(&fixture);

        let ct = encryptor
            .encrypt(b"secret", "dept1", &TransactionRef::new("a", "b", "1"))
            .await
            .unwrap();

        let controller = controller(&fixture);
        assert_eq!(
            controller.decrypt(&ct, "f1", "u1", &["dept1"]).await.unwrap(),
            b"secret"
        );
        // encryption itself leaves no audit trail
        assert_eq!(fixture.store.len(), 4);
    }

    #[tokio::test]
    async fn test_encrypt_with_parsed_policy() {
        let fixture = TestFixture::bootstrapped().await;
        fixture.record_transaction("a", "b", "1").await.unwrap();
        let encryptor = encryptor(&fixture);
        let policy = Policy::parse(&format!(
            "{} OR {}",
            encode("dept1").get(),
            encode("dept2").get()
        ))
        .unwrap();

        let ct = encryptor
            .encrypt_with_policy(b"either", &policy, &TransactionRef::new("a", "b", "1"))
            .await
            .unwrap();

        let controller = controller(&fixture);
        assert!(controller.decrypt(&ct, "f1", "u1", &["dept2"]).await.is_ok());
        assert!(controller.decrypt(&ct, "f1", "u2", &["other"]).await.is_err());
    }

    #[tokio::test]
    async fn test_encrypt_with_released_key() {
        let fixture = TestFixture::bootstrapped().await;
        let encryptor = encryptor(&fixture);

        let ct = encryptor
            .encrypt_with_released_key(
                &fixture.public_key_hex(),
                b"local",
                &Policy::attribute(encode("dept1")),
            )
            .unwrap();
        let controller = controller(&fixture);
        assert_eq!(
            controller.decrypt(&ct, "f1", "u1", &["dept1"]).await.unwrap(),
            b"local"
        );

        assert!(matches!(
            encryptor.encrypt_with_released_key(
                &fixture.master_key_hex(),
                b"local",
                &Policy::attribute(encode("dept1")),
            ),
            Err(EncryptError::InvalidPublicKey(CodecError::KindMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn test_encrypt_panic_is_fault() {
        let fixture = TestFixture::bootstrapped().await;
        fixture.record_transaction("a", "b", "1").await.unwrap();
        let scheme = TestScheme::with_fault(FaultMode::PanicOnEncrypt);
        let encryptor = PolicyEncryptor::new(&scheme, fixture.store.as_ref(), &fixture.keys);

        assert!(matches!(
            encryptor
                .encrypt(b"secret", "dept1", &TransactionRef::new("a", "b", "1"))
                .await,
            Err(EncryptError::Scheme(SchemeError::Fault { operation: "encrypt", .. }))
        ));
    }

    #[tokio::test]
    async fn test_empty_clause_policy_rejected() {
        let fixture = TestFixture::bootstrapped().await;
        fixture.record_transaction("a", "b", "1").await.unwrap();
        let encryptor = encryptor(&fixture);
        let open = Policy::and(Vec::new());

        assert!(matches!(
            encryptor
                .encrypt_with_policy(b"secret", &open, &TransactionRef::new("a", "b", "1"))
                .await,
            Err(EncryptError::Policy(PolicyError::Empty))
        ));
        assert!(matches!(
            encryptor.encrypt_with_released_key(&fixture.public_key_hex(), b"secret", &open),
            Err(EncryptError::Policy(PolicyError::Empty))
        ));
        assert!(matches!(
            encryptor
                .encrypt_with_policy(
                    b"secret",
                    &Policy::or([Policy::attribute(encode("dept1")), Policy::And(vec![])]),
                    &TransactionRef::new("a", "b", "1"),
                )
                .await,
            Err(EncryptError::Policy(PolicyError::Empty))
        ));
    }

    #[tokio::test]
    async fn test_empty_conjunction_never_decrypts() {
        // Sealed directly through the scheme, bypassing the encryptor check.
        let fixture = TestFixture::bootstrapped().await;
        let ct = fixture.encrypt_under(&Policy::and(Vec::new()), b"secret");

        let controller = controller(&fixture);
        let none: [&str; 0] = [];
        assert!(controller.decrypt(&ct, "f1", "anyone", &none).await.is_err());
        assert!(controller.decrypt(&ct, "f1", "u1", &["dept1"]).await.is_err());
    }
}
