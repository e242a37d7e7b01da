//! Gateway configuration.

use std::path::Path;

use policygate_access::DEFAULT_MAX_ATTRIBUTES;
use policygate_core::StateKeys;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Configuration for the Gateway.
///
/// Every field has a default, so `{}` is a valid configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Ledger state keys for key material and transaction markers.
    pub keys: StateKeys,
    /// Most attribute labels accepted in one decrypt request. Requests over
    /// the limit are denied.
    pub max_attributes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            keys: StateKeys::default(),
            max_attributes: DEFAULT_MAX_ATTRIBUTES,
        }
    }
}

impl GatewayConfig {
    /// Parse a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| GatewayError::Configuration(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            GatewayError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let keys = &self.keys;
        if keys.public_key.is_empty()
            || keys.master_key.is_empty()
            || keys.transaction_prefix.is_empty()
        {
            return Err(GatewayError::Configuration("state keys must be non-empty".into()));
        }
        if keys.public_key == keys.master_key {
            return Err(GatewayError::Configuration(
                "public and master key must be stored under different keys".into(),
            ));
        }
        if self.max_attributes == 0 {
            return Err(GatewayError::Configuration(
                "max_attributes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
