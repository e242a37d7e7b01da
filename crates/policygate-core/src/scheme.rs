//! The CP-ABE primitive interface.
//!
//! Policy Gate never implements pairing algebra. It drives an [`AbeScheme`]
//! supplied at startup and treats it as a black box: key material is opaque
//! and only ever serialized through [`crate::KeyCodec`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::attribute::AttributeSet;
use crate::error::SchemeError;
use crate::policy::Policy;

/// Bounds shared by every value an ABE scheme hands out.
pub trait SchemeValue: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> SchemeValue for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// A ciphertext-policy attribute-based encryption scheme.
///
/// Implementations may panic on malformed input. Callers on the decryption
/// path must wrap every call in a guarded boundary.
pub trait AbeScheme: Send + Sync {
    /// Widely distributed encryption key.
    type PublicKey: SchemeValue;
    /// Authority-held key from which attribute keys are derived.
    type MasterKey: SchemeValue;
    /// Key material bound to a set of attributes.
    type AttributeKeys: SchemeValue;
    /// Ciphertext bound to one policy.
    type Ciphertext: SchemeValue;

    /// Generate a fresh public/master key pair.
    fn generate_master_keys(&self) -> Result<(Self::PublicKey, Self::MasterKey), SchemeError>;

    /// Derive attribute keys for `attributes` from the master key.
    fn generate_attribute_keys(
        &self,
        attributes: &AttributeSet,
        master_key: &Self::MasterKey,
    ) -> Result<Self::AttributeKeys, SchemeError>;

    /// Encrypt `plaintext` under `policy`.
    fn encrypt(
        &self,
        plaintext: &[u8],
        policy: &Policy,
        public_key: &Self::PublicKey,
    ) -> Result<Self::Ciphertext, SchemeError>;

    /// Decrypt a ciphertext with attribute keys.
    ///
    /// Returns [`SchemeError::Unsatisfied`] (or another typed error) when the
    /// attributes do not satisfy the ciphertext's policy.
    fn decrypt(
        &self,
        ciphertext: &Self::Ciphertext,
        attribute_keys: &Self::AttributeKeys,
        public_key: &Self::PublicKey,
    ) -> Result<Vec<u8>, SchemeError>;
}
