//! Golden attribute vectors.
//!
//! Attribute ids are baked into ciphertext policies and attribute keys, so
//! every implementation of the attribute codec must reproduce these exactly.

use policygate_core::{encode, AttributeId};

/// A single golden vector: label and its expected attribute id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeVector {
    pub label: &'static str,
    pub id: u32,
    pub description: &'static str,
}

/// All golden vectors.
pub fn all_vectors() -> Vec<AttributeVector> {
    vec![
        AttributeVector {
            label: "",
            id: 0x811c_9dc5,
            description: "empty label yields the FNV offset basis",
        },
        AttributeVector {
            label: "a",
            id: 0x050c_5d7e,
            description: "single byte",
        },
        AttributeVector {
            label: "foobar",
            id: 0x31f0_b262,
            description: "published FNV-1 32-bit test vector",
        },
        AttributeVector {
            label: "dept1",
            id: 681025137,
            description: "department label",
        },
        AttributeVector {
            label: "dept2",
            id: 681025138,
            description: "adjacent department label differs in the low two bits",
        },
        AttributeVector {
            label: "Dept1",
            id: 2831411793,
            description: "labels are case-sensitive",
        },
        AttributeVector {
            label: "other",
            id: 2376466361,
            description: "unrelated label",
        },
        AttributeVector {
            label: "depart_1000",
            id: 3381857473,
            description: "department attribute",
        },
        AttributeVector {
            label: "loc_212",
            id: 3841505675,
            description: "location attribute",
        },
        AttributeVector {
            label: "user_10000",
            id: 1038421912,
            description: "user attribute",
        },
        AttributeVector {
            label: "部门",
            id: 1019125877,
            description: "labels are hashed as UTF-8 bytes",
        },
    ]
}

/// Check every vector, reporting the first mismatch.
pub fn verify_all_vectors() -> Result<(), String> {
    for vector in all_vectors() {
        let got = encode(vector.label);
        if got != AttributeId(vector.id) {
            return Err(format!(
                "{:?}: expected {}, got {}",
                vector.label, vector.id, got
            ));
        }
    }
    Ok(())
}
