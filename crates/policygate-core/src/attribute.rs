//! Attribute codec: human-readable labels to the integer attribute universe.
//!
//! Labels such as `depart_1000` are hashed with 32-bit FNV-1. The mapping is
//! deterministic across processes and platforms, which keeps attribute ids
//! stable for ciphertexts that outlive any single deployment.
//!
//! The hash is a convenience mapping, not a security boundary. Two labels may
//! collide, and callers must not treat `encode` as injective over adversarial
//! input. There is no inverse.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// An integer attribute identifier as consumed by the ABE primitive.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeId(pub u32);

impl AttributeId {
    /// Create from a raw identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw identifier.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttributeId({})", self.0)
    }
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AttributeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// An ordered, de-duplicated set of attribute identifiers.
pub type AttributeSet = BTreeSet<AttributeId>;

/// 32-bit FNV-1 (multiply, then xor).
pub fn fnv1_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        hash.wrapping_mul(FNV_PRIME) ^ u32::from(byte)
    })
}

/// Map a label to its attribute identifier.
pub fn encode(label: &str) -> AttributeId {
    AttributeId(fnv1_32(label.as_bytes()))
}

/// Map every label to its identifier, collapsing duplicates.
pub fn encode_all<I, S>(labels: I) -> AttributeSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels.into_iter().map(|l| encode(l.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fnv1_known_values() {
        assert_eq!(fnv1_32(b""), 0x811c_9dc5);
        assert_eq!(fnv1_32(b"a"), 0x050c_5d7e);
        assert_eq!(fnv1_32(b"foobar"), 0x31f0_b262);
    }

    #[test]
    fn test_encode_department_labels() {
        assert_eq!(encode("dept1"), AttributeId(681025137));
        assert_eq!(encode("dept2"), AttributeId(681025138));
        assert_ne!(encode("dept1"), encode("other"));
    }

    #[test]
    fn test_encode_all_dedups() {
        let set = encode_all(["dept1", "loc_212", "dept1"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(&encode("dept1")));
        assert!(set.contains(&encode("loc_212")));
    }

    #[test]
    fn test_attribute_display() {
        assert_eq!(AttributeId(42).to_string(), "42");
        assert_eq!(format!("{:?}", AttributeId(42)), "AttributeId(42)");
    }

    proptest! {
        #[test]
        fn encode_is_deterministic(label in ".{0,64}") {
            prop_assert_eq!(encode(&label), encode(&label));
        }

        #[test]
        fn encode_all_contains_every_label(labels in prop::collection::vec("[a-z_0-9]{1,12}", 0..8)) {
            let set = encode_all(&labels);
            for label in &labels {
                prop_assert!(set.contains(&encode(label)));
            }
        }
    }
}
