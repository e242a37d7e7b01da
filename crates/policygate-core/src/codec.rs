//! Versioned envelopes for key material and ciphertexts.
//!
//! Every value is wrapped in a CBOR map with small integer keys:
//!
//! ```text
//! { 0: version, 1: kind, 2: body }
//! ```
//!
//! `body` is the CBOR encoding of the scheme value. The `kind` tag makes a
//! public key handed to the master-key decoder fail loudly instead of
//! producing garbage key material.

use std::fmt;
use std::marker::PhantomData;

use ciborium::value::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::CodecError;
use crate::scheme::AbeScheme;

/// Current envelope version.
pub const ENVELOPE_VERSION: u64 = 1;

/// Envelope field keys.
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const VERSION: u64 = 0;
    pub const KIND: u64 = 1;
    pub const BODY: u64 = 2;
}

/// What an envelope contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyKind {
    PublicKey = 1,
    MasterKey = 2,
    AttributeKeys = 3,
    Ciphertext = 4,
}

impl KeyKind {
    /// Convert from the wire tag.
    pub fn from_u64(tag: u64) -> Option<Self> {
        match tag {
            1 => Some(KeyKind::PublicKey),
            2 => Some(KeyKind::MasterKey),
            3 => Some(KeyKind::AttributeKeys),
            4 => Some(KeyKind::Ciphertext),
            _ => None,
        }
    }

    /// The wire tag.
    pub fn to_u64(self) -> u64 {
        self as u64
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KeyKind::PublicKey => "public key",
            KeyKind::MasterKey => "master key",
            KeyKind::AttributeKeys => "attribute keys",
            KeyKind::Ciphertext => "ciphertext",
        };
        f.write_str(name)
    }
}

/// Encode `value` into an envelope of the given kind.
pub fn encode_envelope<T: Serialize>(kind: KeyKind, value: &T) -> Result<Vec<u8>, CodecError> {
    let mut body = Vec::new();
    ciborium::into_writer(value, &mut body).map_err(|e| CodecError::Encode(e.to_string()))?;

    let envelope = Value::Map(vec![
        (
            Value::Integer(keys::VERSION.into()),
            Value::Integer(ENVELOPE_VERSION.into()),
        ),
        (
            Value::Integer(keys::KIND.into()),
            Value::Integer(kind.to_u64().into()),
        ),
        (Value::Integer(keys::BODY.into()), Value::Bytes(body)),
    ]);

    let mut out = Vec::new();
    ciborium::into_writer(&envelope, &mut out).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(out)
}

/// Read the kind tag of an envelope without decoding the body.
pub fn peek_kind(bytes: &[u8]) -> Result<KeyKind, CodecError> {
    let (kind, _) = open_envelope(bytes)?;
    Ok(kind)
}

/// Decode an envelope, requiring it to hold `expected`.
pub fn decode_envelope<T: DeserializeOwned>(
    expected: KeyKind,
    bytes: &[u8],
) -> Result<T, CodecError> {
    let (found, body) = open_envelope(bytes)?;
    if found != expected {
        return Err(CodecError::KindMismatch { expected, found });
    }
    ciborium::from_reader(body.as_slice()).map_err(|e| CodecError::Body {
        kind: expected,
        reason: e.to_string(),
    })
}

fn open_envelope(bytes: &[u8]) -> Result<(KeyKind, Vec<u8>), CodecError> {
    let value: Value =
        ciborium::from_reader(bytes).map_err(|e| CodecError::Malformed(e.to_string()))?;

    let entries = match value {
        Value::Map(entries) => entries,
        _ => return Err(CodecError::Malformed("envelope is not a map".into())),
    };

    let mut version = None;
    let mut kind = None;
    let mut body = None;

    for (key, value) in entries {
        let key = integer(&key).ok_or_else(|| CodecError::Malformed("non-integer key".into()))?;
        match key {
            keys::VERSION => version = integer(&value),
            keys::KIND => kind = integer(&value),
            keys::BODY => {
                if let Value::Bytes(b) = value {
                    body = Some(b);
                }
            }
            other => {
                return Err(CodecError::Malformed(format!("unexpected field {}", other)));
            }
        }
    }

    let version = version.ok_or_else(|| CodecError::Malformed("missing version".into()))?;
    if version != ENVELOPE_VERSION {
        return Err(CodecError::UnsupportedVersion(version));
    }
    let tag = kind.ok_or_else(|| CodecError::Malformed("missing kind".into()))?;
    let kind = KeyKind::from_u64(tag).ok_or(CodecError::UnknownKind(tag))?;
    let body = body.ok_or_else(|| CodecError::Malformed("missing body".into()))?;

    Ok((kind, body))
}

fn integer(value: &Value) -> Option<u64> {
    match value {
        Value::Integer(i) => u64::try_from(*i).ok(),
        _ => None,
    }
}

/// Typed codec for the four value kinds of a scheme `S`.
///
/// ```rust,ignore
/// let bytes = KeyCodec::<MyScheme>::encode_public_key(&pk)?;
/// let pk = KeyCodec::<MyScheme>::decode_public_key(&bytes)?;
/// ```
pub struct KeyCodec<S: AbeScheme>(PhantomData<fn() -> S>);

impl<S: AbeScheme> KeyCodec<S> {
    pub fn encode_public_key(key: &S::PublicKey) -> Result<Vec<u8>, CodecError> {
        encode_envelope(KeyKind::PublicKey, key)
    }

    pub fn decode_public_key(bytes: &[u8]) -> Result<S::PublicKey, CodecError> {
        decode_envelope(KeyKind::PublicKey, bytes)
    }

    pub fn encode_master_key(key: &S::MasterKey) -> Result<Vec<u8>, CodecError> {
        encode_envelope(KeyKind::MasterKey, key)
    }

    pub fn decode_master_key(bytes: &[u8]) -> Result<S::MasterKey, CodecError> {
        decode_envelope(KeyKind::MasterKey, bytes)
    }

    pub fn encode_attribute_keys(keys: &S::AttributeKeys) -> Result<Vec<u8>, CodecError> {
        encode_envelope(KeyKind::AttributeKeys, keys)
    }

    pub fn decode_attribute_keys(bytes: &[u8]) -> Result<S::AttributeKeys, CodecError> {
        decode_envelope(KeyKind::AttributeKeys, bytes)
    }

    pub fn encode_ciphertext(ct: &S::Ciphertext) -> Result<Vec<u8>, CodecError> {
        encode_envelope(KeyKind::Ciphertext, ct)
    }

    pub fn decode_ciphertext(bytes: &[u8]) -> Result<S::Ciphertext, CodecError> {
        decode_envelope(KeyKind::Ciphertext, bytes)
    }

    /// Hex text form of any envelope.
    pub fn to_hex(bytes: &[u8]) -> String {
        hex::encode(bytes)
    }

    /// Inverse of [`KeyCodec::to_hex`].
    pub fn from_hex(text: &str) -> Result<Vec<u8>, CodecError> {
        Ok(hex::decode(text.trim())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        points: Vec<u32>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Other {
        flag: bool,
    }

    fn sample() -> Sample {
        Sample {
            name: "pk".into(),
            points: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_envelope_roundtrip() {
        let bytes = encode_envelope(KeyKind::PublicKey, &sample()).unwrap();
        let decoded: Sample = decode_envelope(KeyKind::PublicKey, &bytes).unwrap();
        assert_eq!(decoded, sample());
        assert_eq!(peek_kind(&bytes).unwrap(), KeyKind::PublicKey);
    }

    #[test]
    fn test_envelope_starts_with_three_entry_map() {
        let bytes = encode_envelope(KeyKind::MasterKey, &sample()).unwrap();
        assert_eq!(bytes[0], 0xa3);
    }

    #[test]
    fn test_kind_mismatch_is_distinguishable() {
        let bytes = encode_envelope(KeyKind::PublicKey, &sample()).unwrap();
        let err = decode_envelope::<Sample>(KeyKind::MasterKey, &bytes).unwrap_err();
        assert!(matches!(
            err,
            CodecError::KindMismatch {
                expected: KeyKind::MasterKey,
                found: KeyKind::PublicKey,
            }
        ));
    }

    #[test]
    fn test_body_shape_mismatch() {
        let bytes = encode_envelope(KeyKind::Ciphertext, &sample()).unwrap();
        let err = decode_envelope::<Other>(KeyKind::Ciphertext, &bytes).unwrap_err();
        assert!(matches!(err, CodecError::Body { kind: KeyKind::Ciphertext, .. }));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            decode_envelope::<Sample>(KeyKind::PublicKey, b"yes"),
            Err(CodecError::Malformed(_))
        ));
        assert!(matches!(
            decode_envelope::<Sample>(KeyKind::PublicKey, &[]),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn test_unsupported_version() {
        let envelope = Value::Map(vec![
            (Value::Integer(0.into()), Value::Integer(9.into())),
            (Value::Integer(1.into()), Value::Integer(1.into())),
            (Value::Integer(2.into()), Value::Bytes(vec![])),
        ]);
        let mut bytes = Vec::new();
        ciborium::into_writer(&envelope, &mut bytes).unwrap();

        assert!(matches!(
            decode_envelope::<Sample>(KeyKind::PublicKey, &bytes),
            Err(CodecError::UnsupportedVersion(9))
        ));
    }

    #[test]
    fn test_unknown_kind() {
        let envelope = Value::Map(vec![
            (Value::Integer(0.into()), Value::Integer(1.into())),
            (Value::Integer(1.into()), Value::Integer(77.into())),
            (Value::Integer(2.into()), Value::Bytes(vec![])),
        ]);
        let mut bytes = Vec::new();
        ciborium::into_writer(&envelope, &mut bytes).unwrap();

        assert!(matches!(peek_kind(&bytes), Err(CodecError::UnknownKind(77))));
    }

    #[test]
    fn test_kind_tags() {
        for kind in [
            KeyKind::PublicKey,
            KeyKind::MasterKey,
            KeyKind::AttributeKeys,
            KeyKind::Ciphertext,
        ] {
            assert_eq!(KeyKind::from_u64(kind.to_u64()), Some(kind));
        }
        assert_eq!(KeyKind::from_u64(0), None);
    }
}
