//! A policy-enforcing stand-in for a pairing-based CP-ABE scheme.
//!
//! The master key is an Ed25519 signing seed and attribute keys are signed
//! attribute sets. Ciphertexts are sealed with ChaCha20-Poly1305 under a key
//! derived from the public key, the policy and a nonce, so tampering with
//! the embedded policy breaks decryption. Anyone holding the public key can
//! derive the content key: this scheme models access-control behaviour for
//! tests and has no confidentiality.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use policygate_core::{AbeScheme, AttributeSet, Policy, SchemeError};

const ATTRIBUTE_DOMAIN: &[u8] = b"policygate-testkit-v1 attributes";
const CONTENT_KEY_CONTEXT: &str = "policygate-testkit-v1 content key";

/// Injected misbehaviour, for exercising fault handling in callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultMode {
    #[default]
    None,
    /// `decrypt` panics.
    PanicOnDecrypt,
    /// `generate_attribute_keys` panics.
    PanicOnKeyGeneration,
    /// `generate_attribute_keys` returns an error.
    FailKeyGeneration,
    /// `encrypt` panics.
    PanicOnEncrypt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPublicKey {
    pub verifying_key: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMasterKey {
    pub signing_seed: [u8; 32],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestAttributeKeys {
    pub attributes: AttributeSet,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCiphertext {
    pub policy: Policy,
    pub nonce: [u8; 12],
    pub sealed: Vec<u8>,
}

/// The test scheme.
#[derive(Debug, Clone, Default)]
pub struct TestScheme {
    fault: FaultMode,
}

impl TestScheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scheme that misbehaves as described by `fault`.
    pub fn with_fault(fault: FaultMode) -> Self {
        Self { fault }
    }

    /// Deterministic key pair from a seed.
    pub fn keys_from_seed(seed: [u8; 32]) -> (TestPublicKey, TestMasterKey) {
        let signing = SigningKey::from_bytes(&seed);
        (
            TestPublicKey {
                verifying_key: signing.verifying_key().to_bytes(),
            },
            TestMasterKey { signing_seed: seed },
        )
    }
}

fn attribute_message(attributes: &AttributeSet) -> Vec<u8> {
    let mut msg = ATTRIBUTE_DOMAIN.to_vec();
    for id in attributes {
        msg.extend_from_slice(&id.get().to_be_bytes());
    }
    msg
}

fn content_cipher(
    public_key: &TestPublicKey,
    policy: &Policy,
    nonce: &[u8; 12],
) -> Result<ChaCha20Poly1305, SchemeError> {
    let mut hasher = blake3::Hasher::new_derive_key(CONTENT_KEY_CONTEXT);
    hasher.update(&public_key.verifying_key);
    hasher.update(policy.to_string().as_bytes());
    hasher.update(nonce);
    let key = hasher.finalize();
    ChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| SchemeError::Encryption(e.to_string()))
}

impl AbeScheme for TestScheme {
    type PublicKey = TestPublicKey;
    type MasterKey = TestMasterKey;
    type AttributeKeys = TestAttributeKeys;
    type Ciphertext = TestCiphertext;

    fn generate_master_keys(&self) -> Result<(Self::PublicKey, Self::MasterKey), SchemeError> {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        Ok(Self::keys_from_seed(seed))
    }

    fn generate_attribute_keys(
        &self,
        attributes: &AttributeSet,
        master_key: &Self::MasterKey,
    ) -> Result<Self::AttributeKeys, SchemeError> {
        match self.fault {
            FaultMode::PanicOnKeyGeneration => panic!("keygen fault injected"),
            FaultMode::FailKeyGeneration => {
                return Err(SchemeError::KeyGeneration("keygen failure injected".into()))
            }
            _ => {}
        }

        let signing = SigningKey::from_bytes(&master_key.signing_seed);
        let signature = signing.sign(&attribute_message(attributes));
        Ok(TestAttributeKeys {
            attributes: attributes.clone(),
            signature: signature.to_bytes().to_vec(),
        })
    }

    fn encrypt(
        &self,
        plaintext: &[u8],
        policy: &Policy,
        public_key: &Self::PublicKey,
    ) -> Result<Self::Ciphertext, SchemeError> {
        if self.fault == FaultMode::PanicOnEncrypt {
            panic!("encrypt fault injected");
        }

        let mut nonce = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce);

        let sealed = content_cipher(public_key, policy, &nonce)?
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| SchemeError::Encryption(e.to_string()))?;

        Ok(TestCiphertext {
            policy: policy.clone(),
            nonce,
            sealed,
        })
    }

    fn decrypt(
        &self,
        ciphertext: &Self::Ciphertext,
        attribute_keys: &Self::AttributeKeys,
        public_key: &Self::PublicKey,
    ) -> Result<Vec<u8>, SchemeError> {
        if self.fault == FaultMode::PanicOnDecrypt {
            panic!("decrypt fault injected");
        }

        let verifying = VerifyingKey::from_bytes(&public_key.verifying_key)
            .map_err(|e| SchemeError::Decryption(format!("invalid public key: {}", e)))?;
        let sig_bytes: [u8; 64] = attribute_keys
            .signature
            .as_slice()
            .try_into()
            .map_err(|_| SchemeError::Decryption("malformed attribute keys".into()))?;
        verifying
            .verify(
                &attribute_message(&attribute_keys.attributes),
                &Signature::from_bytes(&sig_bytes),
            )
            .map_err(|_| SchemeError::Decryption("attribute keys not issued by this authority".into()))?;

        if !ciphertext.policy.is_satisfied_by(&attribute_keys.attributes) {
            return Err(SchemeError::Unsatisfied);
        }

        content_cipher(public_key, &ciphertext.policy, &ciphertext.nonce)?
            .decrypt(Nonce::from_slice(&ciphertext.nonce), ciphertext.sealed.as_slice())
            .map_err(|e| SchemeError::Decryption(e.to_string()))
    }
}
