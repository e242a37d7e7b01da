//! Proptest generators for property-based testing.

use proptest::prelude::*;

use policygate_core::{AttributeId, Policy, TransactionRef};

/// Generate an attribute label like `dept_12` or `loc_3`.
pub fn attribute_label() -> impl Strategy<Value = String> {
    "(dept|loc|user|role)_[0-9]{1,5}".prop_map(String::from)
}

/// Generate up to `max` attribute labels.
pub fn attribute_labels(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(attribute_label(), 0..=max)
}

/// Generate an actor or object identifier.
pub fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,15}".prop_map(String::from)
}

/// Generate plaintext bytes of at most `max_len`.
pub fn plaintext(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a transaction triple with non-empty parts.
pub fn transaction_ref() -> impl Strategy<Value = TransactionRef> {
    (identifier(), identifier(), "[a-z0-9]{1,12}")
        .prop_map(|(from, to, id)| TransactionRef::new(from, to, id))
}

/// Generate a policy over the given attribute pool, nested up to `depth`.
pub fn policy(pool: Vec<AttributeId>, depth: u32) -> impl Strategy<Value = Policy> {
    let leaf = prop::sample::select(pool).prop_map(Policy::Attribute);
    leaf.prop_recursive(depth, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4).prop_map(Policy::and),
            prop::collection::vec(inner, 2..4).prop_map(Policy::or),
        ]
    })
}
