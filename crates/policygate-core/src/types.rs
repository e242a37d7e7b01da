//! Ledger record types and state-key naming.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One decryption attempt against a protected object.
///
/// Serialized as `{"id": "...", "result": true}` inside the object's audit
/// array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The actor that attempted decryption.
    #[serde(rename = "id")]
    pub actor_id: String,
    /// Whether decryption succeeded.
    #[serde(rename = "result")]
    pub succeeded: bool,
}

impl AuditRecord {
    pub fn new(actor_id: impl Into<String>, succeeded: bool) -> Self {
        Self {
            actor_id: actor_id.into(),
            succeeded,
        }
    }
}

/// A declared business transaction between two parties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRef {
    pub from: String,
    pub to: String,
    pub transaction_id: String,
}

impl TransactionRef {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        transaction_id: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            transaction_id: transaction_id.into(),
        }
    }

    /// True when any component is empty.
    pub fn has_empty_part(&self) -> bool {
        self.from.is_empty() || self.to.is_empty() || self.transaction_id.is_empty()
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.transaction_id)
    }
}

/// Names of the ledger state entries Policy Gate reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateKeys {
    /// Key holding the encoded public key.
    pub public_key: String,
    /// Key holding the encoded master key.
    pub master_key: String,
    /// Prefix of transaction presence markers.
    pub transaction_prefix: String,
}

impl Default for StateKeys {
    fn default() -> Self {
        Self {
            public_key: "public_key".into(),
            master_key: "master_key".into(),
            transaction_prefix: "trans".into(),
        }
    }
}

impl StateKeys {
    /// `<prefix>_<from>_<to>_<transaction_id>`
    pub fn transaction(&self, tx: &TransactionRef) -> String {
        format!(
            "{}_{}_{}_{}",
            self.transaction_prefix, tx.from, tx.to, tx.transaction_id
        )
    }

    /// True if `key` collides with key material or transaction markers.
    pub fn is_reserved(&self, key: &str) -> bool {
        key == self.public_key
            || key == self.master_key
            || key.starts_with(&format!("{}_", self.transaction_prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_record_json_shape() {
        let record = AuditRecord::new("u1", true);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":"u1","result":true}"#);

        let back: AuditRecord = serde_json::from_str(r#"{"id":"u2","result":false}"#).unwrap();
        assert_eq!(back, AuditRecord::new("u2", false));
    }

    #[test]
    fn test_transaction_key() {
        let keys = StateKeys::default();
        let tx = TransactionRef::new("dept1", "dept2", "tx1");
        assert_eq!(keys.transaction(&tx), "trans_dept1_dept2_tx1");
    }

    #[test]
    fn test_reserved_keys() {
        let keys = StateKeys::default();
        assert!(keys.is_reserved("public_key"));
        assert!(keys.is_reserved("master_key"));
        assert!(keys.is_reserved("trans_a_b_c"));
        assert!(!keys.is_reserved("f1"));
        assert!(!keys.is_reserved("transcript"));
    }

    #[test]
    fn test_state_keys_partial_config() {
        let keys: StateKeys = serde_json::from_str(r#"{"transaction_prefix":"tx"}"#).unwrap();
        assert_eq!(keys.public_key, "public_key");
        assert_eq!(keys.transaction_prefix, "tx");
    }
}
