//! Controller configuration.
//!
//! Example `twap.toml`:
//!
//! ```toml
//! chain_id = 1
//! settlement_contract = "0x9008d19f58aabd9ed0d60971565aa8510560ab41"
//! notification_capacity = 64
//! log_filter = "info,twap=debug"
//! ```

use std::path::Path;

use alloy::primitives::Address;
use alloy::sol_types::Eip712Domain;
use serde::{Deserialize, Serialize};
use twap_core::settlement_domain;

use crate::error::{ControllerError, ControllerResult};

/// Lifecycle controller configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Chain the settlement contract and wallet live on. Default: 1.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Settlement contract; the EIP-712 verifying contract for order and
    /// authorization digests.
    pub settlement_contract: Address,

    /// Buffered creation notifications per subscriber. Default: 64.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,

    /// `tracing` filter directive. Default: "info".
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_chain_id() -> u64 {
    1
}

fn default_notification_capacity() -> usize {
    64
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            settlement_contract: Address::ZERO,
            notification_capacity: default_notification_capacity(),
            log_filter: default_log_filter(),
        }
    }
}

impl ControllerConfig {
    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ControllerResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;

        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(content: &str) -> ControllerResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ControllerError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every digest meaningless.
    pub fn validate(&self) -> ControllerResult<()> {
        if self.settlement_contract.is_zero() {
            return Err(ControllerError::Config(
                "settlement_contract must be set".to_string(),
            ));
        }
        if self.notification_capacity == 0 {
            return Err(ControllerError::Config(
                "notification_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// EIP-712 domain of the settlement contract.
    pub fn settlement_domain(&self) -> Eip712Domain {
        settlement_domain(self.chain_id, self.settlement_contract)
    }
}
