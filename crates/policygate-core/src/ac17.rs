//! AC17 (FAME) CP-ABE adapter over the `rabe` crate.
//!
//! Attribute identifiers are passed to `rabe` as their decimal strings and
//! policies are rendered with [`Policy::to_human_policy`].

use std::fmt::Display;

use rabe::schemes::ac17::{
    self, Ac17CpCiphertext, Ac17CpSecretKey, Ac17MasterKey, Ac17PublicKey,
};
use rabe::utils::policy::pest::PolicyLanguage;

use crate::attribute::AttributeSet;
use crate::error::SchemeError;
use crate::policy::Policy;
use crate::scheme::AbeScheme;

/// The AC17 ciphertext-policy scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ac17Scheme;

impl Ac17Scheme {
    pub fn new() -> Self {
        Self
    }
}

/// Normalizes the mix of `Option` and `Result` returns across `rabe`.
trait IntoSchemeResult<T> {
    fn or_scheme(self, err: fn(String) -> SchemeError) -> Result<T, SchemeError>;
}

impl<T> IntoSchemeResult<T> for Option<T> {
    fn or_scheme(self, err: fn(String) -> SchemeError) -> Result<T, SchemeError> {
        self.ok_or_else(|| err("no result".into()))
    }
}

impl<T, E: Display> IntoSchemeResult<T> for Result<T, E> {
    fn or_scheme(self, err: fn(String) -> SchemeError) -> Result<T, SchemeError> {
        self.map_err(|e| err(e.to_string()))
    }
}

impl AbeScheme for Ac17Scheme {
    type PublicKey = Ac17PublicKey;
    type MasterKey = Ac17MasterKey;
    type AttributeKeys = Ac17CpSecretKey;
    type Ciphertext = Ac17CpCiphertext;

    fn generate_master_keys(&self) -> Result<(Self::PublicKey, Self::MasterKey), SchemeError> {
        Ok(ac17::setup())
    }

    fn generate_attribute_keys(
        &self,
        attributes: &AttributeSet,
        master_key: &Self::MasterKey,
    ) -> Result<Self::AttributeKeys, SchemeError> {
        let names: Vec<String> = attributes.iter().map(|a| a.to_string()).collect();
        ac17::cp_keygen(master_key, &names).or_scheme(SchemeError::KeyGeneration)
    }

    fn encrypt(
        &self,
        plaintext: &[u8],
        policy: &Policy,
        public_key: &Self::PublicKey,
    ) -> Result<Self::Ciphertext, SchemeError> {
        policy
            .validate()
            .map_err(|e| SchemeError::Encryption(e.to_string()))?;
        let policy = policy.to_human_policy();
        ac17::cp_encrypt(public_key, &policy, plaintext, PolicyLanguage::HumanPolicy)
            .or_scheme(SchemeError::Encryption)
    }

    fn decrypt(
        &self,
        ciphertext: &Self::Ciphertext,
        attribute_keys: &Self::AttributeKeys,
        _public_key: &Self::PublicKey,
    ) -> Result<Vec<u8>, SchemeError> {
        ac17::cp_decrypt(attribute_keys, ciphertext).or_scheme(SchemeError::Decryption)
    }
}
